use std::io;
use std::path::Path;

use anyhow::Context;
use clap_complete::{generate, Shell};

use crate::cli::build_cli_command;

pub fn handle(shell: Shell, out: Option<&Path>) -> anyhow::Result<()> {
    let mut command = build_cli_command();
    let name = command.get_name().to_string();

    match out {
        Some(path) => {
            let mut file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
            generate(shell, &mut command, name, &mut file);
        }
        None => generate(shell, &mut command, name, &mut io::stdout()),
    }
    Ok(())
}
