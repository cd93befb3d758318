// Serial check: open the commutator port and send a single jog
//
// Use this before running the runtime to confirm the port name and that the
// motor reacts to the `{turn: ...}` line format.
//
// Usage: cargo run --example serial_check -- <port> [turn]
// Example: cargo run --example serial_check -- /dev/ttyACM0 0.1

use std::io::{self, Write};

use commutator_zenoh_runtime::commutator::{Commutator, ManualScheduler, SerialTransport, encode_turn};
use commutator_zenoh_runtime::config::{DEFAULT_BAUD_RATE, JOG_STEP_TURNS};

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(port) = args.next() else {
        println!("Usage: serial_check <port> [turn]");
        return Ok(());
    };
    let turn: f64 = match args.next() {
        Some(arg) => arg.parse()?,
        None => JOG_STEP_TURNS,
    };

    println!("Serial port: {} @ {} baud", port, DEFAULT_BAUD_RATE);
    println!("Command:     {:?}", String::from_utf8_lossy(&encode_turn(turn)));
    println!();

    let commutator = Commutator::new(SerialTransport::serial(), ManualScheduler::new());

    println!("Step 1: Opening serial port...");
    if !commutator.configure_serial_port(&port) {
        println!("  ✗ Failed to open serial port");
        println!();
        println!("Troubleshooting:");
        println!("  - Check the port path is correct");
        println!("  - Verify the USB cable is connected");
        println!("  - Make sure no other program holds the port");
        return Ok(());
    }
    println!("  ✓ Serial port opened");
    println!();

    println!("Step 2: Readiness check...");
    if commutator.is_ready() {
        println!("  ✓ Ready (port open, default yaw axis)");
    } else {
        println!("  ✗ Not ready, see log");
        return Ok(());
    }
    println!();

    if !confirm("The commutator will turn. Proceed?")? {
        println!("Aborted.");
        return Ok(());
    }

    println!("Step 3: Sending manual turn...");
    if commutator.manual_turn(turn) {
        println!("  ✓ Sent");
    } else {
        println!("  ✗ Write failed, see log");
    }

    Ok(())
}
