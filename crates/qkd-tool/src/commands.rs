//! Subcommand implementations, writing their report to `out`.

use std::{
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use qkd_crypto::{Association, AssociationDefinition, Scheme, checksum, engine};

use crate::error::ToolError;

const READ_CHUNK: usize = 64 * 1024;

/// Inputs of the `budget` subcommand.
#[derive(Debug, Default)]
pub struct BudgetArgs {
    pub definition: Option<PathBuf>,
    pub auth_in: Option<String>,
    pub auth_out: Option<String>,
    pub enc_in: Option<String>,
    pub enc_out: Option<String>,
    pub strict: bool,
}

pub fn scheme(text: &str, out: &mut impl Write) -> Result<(), ToolError> {
    let parsed = Scheme::parse(text).map_err(qkd_crypto::CryptoError::from)?;
    let context = engine::create(&parsed)?;
    tracing::debug!(algorithm = context.name(), "scheme is usable");

    writeln!(out, "scheme:         {}", context.scheme())?;
    writeln!(out, "algorithm:      {}", context.name())?;
    writeln!(out, "init key size:  {}", context.init_key_size())?;
    writeln!(out, "final key size: {}", context.final_key_size())?;
    Ok(())
}

pub fn budget(args: &BudgetArgs, out: &mut impl Write) -> Result<(), ToolError> {
    let mut definition = match &args.definition {
        Some(path) => load_definition(path)?,
        None => AssociationDefinition::default(),
    };

    let overrides = [
        (&args.auth_in, &mut definition.authentication_incoming),
        (&args.auth_out, &mut definition.authentication_outgoing),
        (&args.enc_in, &mut definition.encryption_incoming),
        (&args.enc_out, &mut definition.encryption_outgoing),
    ];
    for (flag, field) in overrides {
        if let Some(text) = flag {
            field.clone_from(text);
        }
    }

    let bytes = if args.strict {
        Association::key_budget(&definition)?
    } else {
        Association::key_consumption(&definition)
    };
    if bytes == 0 && !args.strict {
        tracing::info!("0 bytes: all schemes are null, or the definition is unusable (see --strict)");
    }

    writeln!(out, "{bytes}")?;
    Ok(())
}

pub fn checksum(algorithm: &str, path: &Path, out: &mut impl Write) -> Result<(), ToolError> {
    let mut checksum = checksum::create(algorithm)?;
    let read_error = |source| ToolError::Read { path: path.to_owned(), source };

    let mut input: Box<dyn Read> = if path.as_os_str() == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(path).map_err(read_error)?)
    };

    let mut chunk = vec![0u8; READ_CHUNK];
    let mut total = 0usize;
    loop {
        let read = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(read_error(err)),
        };
        checksum.add(&chunk[..read]);
        total += read;
    }
    tracing::debug!(algorithm, bytes = total, "checksummed input");

    writeln!(out, "{}  {}", checksum.finalize(), path.display())?;
    Ok(())
}

fn load_definition(path: &Path) -> Result<AssociationDefinition, ToolError> {
    let file = File::open(path).map_err(|source| ToolError::Read { path: path.to_owned(), source })?;
    serde_json::from_reader(io::BufReader::new(file))
        .map_err(|source| ToolError::Definition { path: path.to_owned(), source })
}
