use clap::Parser;
use dleq_cli::commands::{configure_threads, print_keys, print_random_keypair, prove, verify};
use dleq_cli::config::{CliCommand, Config, GlobalOptions};
use log::*;

fn main() {
    env_logger::init();
    let config: Config = Config::parse();

    let result = config.to_parts().map_err(anyhow::Error::from).and_then(|(options, command)| run(command, options));

    if let Err(err) = result {
        eprintln!("** Error ** \n {err}");
        std::process::exit(1);
    }
}

fn run(command: CliCommand, options: GlobalOptions) -> Result<(), anyhow::Error> {
    configure_threads(options.threads)?;
    let mut stdout = std::io::stdout().lock();
    match command {
        CliCommand::Generate => print_random_keypair(&mut stdout)?,
        CliCommand::Keys { private_key } => print_keys(&private_key, &mut stdout)?,
        CliCommand::Prove(cmd) => prove(&cmd, options.output_format, &mut stdout)?,
        CliCommand::Verify(cmd) => {
            info!("Verifying {}", cmd.proof.to_str().unwrap_or("[invalid utf-8 path]"));
            verify(&cmd, &mut stdout)?
        }
    }
    Ok(())
}
