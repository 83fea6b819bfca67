//! Prints the result of the operand binding idiom.
//!
//! The printed value is whatever the result register held: the inputs are
//! never wired into the block. Only the portable backend is deterministic.

use asm_idioms::config::Config;
use asm_idioms::{Error, Idiom};

const IDIOM: Idiom = Idiom::OperandBinding;

fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    config.configure_logging()?;
    log::debug!("{}: running on the {} backend", IDIOM, config.backend);

    let value = IDIOM.run(config.backend)?;
    println!("{}", IDIOM.render(value));
    Ok(())
}
