#![doc = include_str!("../README.md")]

use crate::error::CliError;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ed25519 / secp256k1 cross-group DLEq proofs.
///
/// Generates key pairs that share one secret across both curves, and proves or verifies that they do.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Path to the configuration file. The default is `$HOME/.dleq/config.yml`.
    #[arg(long = "config-file", short = 'c', env = "DLEQ_CONFIG")]
    pub config_file: Option<PathBuf>,
    /// Proof output format. Overrides the configuration file.
    #[arg(long = "format", short = 'f', value_enum)]
    pub output_format: Option<OutputFormat>,
    /// Number of worker threads. Overrides the configuration file.
    #[arg(long = "threads", short = 't', env = "DLEQ_THREADS")]
    pub threads: Option<usize>,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate a new private key and print it with its public keys.
    #[command(name = "generate", alias = "new")]
    Generate,
    /// Print the public keys of a private key.
    #[command(name = "keys")]
    Keys {
        /// The private key, as 64 hex characters (32 bytes, little-endian).
        private_key: String,
    },
    /// Prove that the Ed25519 and secp256k1 public keys of a private key share the same secret.
    #[command(name = "prove")]
    Prove(ProveCommand),
    /// Verify a proof and print the public keys it proves.
    #[command(name = "verify")]
    Verify(VerifyCommand),
}

#[derive(Debug, Args)]
pub struct ProveCommand {
    /// The private key to prove, as 64 hex characters. A new key is generated if omitted.
    #[arg(long = "key", short = 'k', env = "DLEQ_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
    /// Write the proof to this file instead of stdout.
    #[arg(long = "out", short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// File holding the proof, hex or binary.
    pub proof: PathBuf,
    /// Fail unless the proof is for this public key pair (130 hex characters: Ed25519 key, then secp256k1 key).
    #[arg(long = "expect", short = 'e')]
    pub expected_keys: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Hex,
    Binary,
}

/// Defaults read from the YAML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DleqConfig {
    pub output_format: OutputFormat,
    pub threads: Option<usize>,
}

impl DleqConfig {
    /// Loads the configuration file, falling back to the defaults when it does not exist.
    pub fn try_load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, CliError> {
        let path = path.map(|p| p.as_ref().to_path_buf()).unwrap_or_else(default_config_path);
        match std::fs::File::open(&path) {
            Ok(file) => {
                let reader = std::io::BufReader::new(file);
                Ok(serde_yml::from_reader(reader)?)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        // Create directory path if required
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_yml::to_writer(writer, self)?;
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    let mut home = std::env::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.push(".dleq");
    home.push("config.yml");
    home
}

pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub threads: Option<usize>,
}

impl Config {
    /// Merges the command line over the configuration file.
    pub fn to_parts(self) -> Result<(GlobalOptions, CliCommand), CliError> {
        let file = DleqConfig::try_load(self.config_file.as_ref())?;
        let global = GlobalOptions {
            output_format: self.output_format.unwrap_or(file.output_format),
            threads: self.threads.or(file.threads),
        };
        Ok((global, self.command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DleqConfig::try_load(Some(dir.path().join("nope.yml"))).unwrap();
        assert_eq!(config, DleqConfig::default());
        assert_eq!(config.output_format, OutputFormat::Hex);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        let config = DleqConfig { output_format: OutputFormat::Binary, threads: Some(2) };
        config.save(&path).unwrap();
        assert_eq!(DleqConfig::try_load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn partial_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "threads: 3\n").unwrap();
        let config = DleqConfig::try_load(Some(&path)).unwrap();
        assert_eq!(config.threads, Some(3));
        assert_eq!(config.output_format, OutputFormat::Hex);

        std::fs::write(&path, "output_format: base64\n").unwrap();
        assert!(matches!(DleqConfig::try_load(Some(&path)), Err(CliError::InvalidConfig(_))));
    }

    #[test]
    fn command_line_overrides_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "output_format: binary\nthreads: 8\n").unwrap();
        let path = path.to_str().unwrap();

        let config = Config::parse_from(["dleq", "-c", path, "--threads", "2", "generate"]);
        let (global, command) = config.to_parts().unwrap();
        assert_eq!(global.output_format, OutputFormat::Binary);
        assert_eq!(global.threads, Some(2));
        assert!(matches!(command, CliCommand::Generate));

        let config = Config::parse_from(["dleq", "-c", path, "-f", "hex", "verify", "proof.hex"]);
        let (global, command) = config.to_parts().unwrap();
        assert_eq!(global.output_format, OutputFormat::Hex);
        assert_eq!(global.threads, Some(8));
        assert!(matches!(command, CliCommand::Verify(VerifyCommand { expected_keys: None, .. })));
    }
}
