use std::str::FromStr;

use color_eyre::eyre::{eyre, Result};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use vm16::cpu::Cpu;
use vm16::memory::Memory;

const SOURCE: &str = r#"
# place a word for the final load
0x1000:
    !W 0x4566

# compute 0x00AB + 0x34FA, then fetch the stored word
0x0000:
    MOV_LITERAL_TO_REG 0x00AB r1
    MOV_LITERAL_TO_REG 0x34FA r2
    ADD_REG_TO_REG r1 r2
    MOV_MEM_TO_REG 0x1000 r4
"#;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .unwrap(); // logging

    let memory = Memory::from_str(SOURCE)
        .map_err(|errors| eyre!("{} errors in program text", errors.len()))?;

    let mut cpu = Cpu::new(memory);
    for _ in 0..4 {
        cpu.step()?;
    }

    print!("{}", cpu.snapshot());

    Ok(())
}
