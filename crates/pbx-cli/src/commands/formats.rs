//! Formats command

use anyhow::Result;
use pbx_core::PixelFormat;

pub fn run() -> Result<()> {
    println!("{:<6} {:>3}  {:<10} host name", "name", "ch", "letters");
    for fmt in PixelFormat::ALL {
        let letters = if fmt.is_raw() {
            "-".to_string()
        } else {
            fmt.aliases().join(",")
        };
        println!(
            "{:<6} {:>3}  {:<10} {}",
            fmt.name(),
            fmt.channels(),
            letters,
            fmt.host_name().unwrap_or("-")
        );
    }
    println!("\nPositional names c1..c4 work in every format.");
    Ok(())
}
