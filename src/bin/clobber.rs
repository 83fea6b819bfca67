//! Prints the result of the clobber declaration idiom.

use asm_idioms::config::Config;
use asm_idioms::{Error, Idiom};

const IDIOM: Idiom = Idiom::ClobberDeclaration;

fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    config.configure_logging()?;
    log::debug!("{}: running on the {} backend", IDIOM, config.backend);

    let value = IDIOM.run(config.backend)?;
    println!("{}", IDIOM.render(value));
    Ok(())
}
