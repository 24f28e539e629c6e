use crate::common::AccessStatus;

const BANNER: &str = "       Recording Light Status      ";

pub fn print_status(response: &str) {
    println!("{}", BANNER);

    if response.is_empty() {
        println!("No response from daemon\n");
        return;
    }

    println!("Daemon: Running\n");
    for (key, value) in response.split_whitespace().filter_map(|t| t.split_once('=')) {
        match key {
            "ACCESS" => match AccessStatus::from_wire(value) {
                Some(status) => {
                    let icon = if status.is_ready() { "✓" } else { "✗" };
                    println!("  {} Access:   {} ({})", icon, status.label(), status.hint());
                }
                None => println!("  ? Access:   {}", value),
            },
            "LIGHT" => {
                println!("    Light:    {}", value.to_uppercase());
            }
            "MODE" => {
                println!("    Mode:     {}", value.to_lowercase());
            }
            "BRIGHTNESS" => {
                println!("    Level:    {}/255", value);
            }
            "SPEED" => {
                println!("    Speed:    {}", value);
            }
            "ANIMATING" if value == "true" => {
                println!("    Animation running");
            }
            "TILE" if value == "false" => {
                println!("    Tip: bind `reclightctl toggle` to a shortcut, then run `reclightctl tile-added`");
            }
            "LOG_LEVEL" => {
                println!("    Log:      {}", value);
            }
            _ => {}
        }
    }

    println!();
}

pub fn print_daemon_stopped() {
    println!("{}", BANNER);
    println!(" Daemon: Not running\n");
}

pub fn print_success(message: &str) {
    println!(" {}", message);
}

pub fn print_error(message: &str) {
    eprintln!(" Error: {}", message);
}
