use avr_uart::{resolve_divisor, BaudSetting, BAUD_TABLE};
use console::style;

use crate::error::Result;

fn percent(permille: i32) -> f32 {
    permille as f32 / 10.0
}

pub fn print_baud_table(clock: Option<u32>) {
    println!("{:>10} {:>7} {:>5} {:>4} {:>8} {:>7}  formula", "clock", "baud", "UBRR", "U2X", "actual", "error");

    let rows = BAUD_TABLE.iter()
        .filter(|e| clock.map_or(true, |c| c == e.clock_hz));

    for entry in rows {
        let setting = entry.setting();
        let check = match BaudSetting::from_formula(entry.clock_hz, entry.baud_rate, entry.oversampling) {
            Some(computed) if computed == setting => style("ok".to_string()).green(),
            Some(computed) => style(format!("mismatch ({})", computed.divisor)).red(),
            None => style("out of range".to_string()).red(),
        };

        println!("{:>10} {:>7} {:>5} {:>4} {:>8} {:>6.1}%  {}",
            entry.clock_hz,
            entry.baud_rate,
            entry.divisor,
            if entry.oversampling { "on" } else { "off" },
            setting.actual_baud_rate(entry.clock_hz),
            percent(setting.error_permille(entry.clock_hz, entry.baud_rate)),
            check,
        );
    }
}

pub fn print_resolve(clock: u32, baud: u32) -> Result<()> {
    let setting = resolve_divisor(BAUD_TABLE, clock, baud)?;

    println!("{baud} baud @ {clock} Hz");
    println!("\tUBRR={} (H=0x{:02x} L=0x{:02x}) U2X={}",
        setting.divisor, setting.high(), setting.low(), setting.oversampling as u8,
    );
    println!("\tactual {} baud, error {:.1}%",
        setting.actual_baud_rate(clock),
        percent(setting.error_permille(clock, baud)),
    );

    Ok(())
}
