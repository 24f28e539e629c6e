use super::{app::*, client::IpcClient, output};
use crate::Result;
use crate::common::SOCKET_PATH;

pub async fn execute(cli: Cli) -> Result<()> {
    let socket = cli.socket.as_deref().unwrap_or(SOCKET_PATH);
    let client = IpcClient::with_path(socket);

    match cli.command {
        Commands::Status => {
            handle_status(&client).await?;
        }

        Commands::On => {
            let resp = client.send("ON").await?;
            print_result(&resp, "Light");
        }

        Commands::Off => {
            let resp = client.send("OFF").await?;
            print_result(&resp, "Light");
        }

        Commands::Toggle => {
            let resp = client.send("TOGGLE").await?;
            print_result(&resp, "Light");
        }

        Commands::Mode { mode } => {
            let cmd = format!("SET_MODE {}", mode.to_upper_str());
            let resp = client.send(&cmd).await?;
            print_result(&resp, "Mode set");
        }

        Commands::Brightness { value } => {
            let cmd = format!("SET_BRIGHTNESS {}", value);
            let resp = client.send(&cmd).await?;
            print_result(&resp, "Brightness set");
        }

        Commands::Speed { value } => {
            let cmd = format!("SET_SPEED {}", value);
            let resp = client.send(&cmd).await?;
            print_result(&resp, "Speed set");
        }

        Commands::GetBrightness => {
            let resp = client.send("GET_BRIGHTNESS").await?;
            match resp.strip_prefix("BRIGHTNESS=") {
                Some("-1") => output::print_error("LED brightness could not be read"),
                Some(value) => println!("Current brightness: {}", value),
                None => output::print_error(&resp),
            }
        }

        Commands::RequestPermission => {
            let resp = client.send("REQUEST_PERMISSION").await?;
            print_result(&resp, "Permission requested");
        }

        Commands::SetLog { level } => {
            let cmd = format!("SET_LOG {}", level.to_upper_str());
            let resp = client.send(&cmd).await?;
            print_result(&resp, "Log level set");
        }

        Commands::Reload => {
            let resp = client.send("RELOAD").await?;
            print_result(&resp, "Preferences reloaded");
        }

        Commands::GetPid => {
            let resp = client.send("GET_PID").await?;
            println!("Daemon {}", resp);
        }

        Commands::Ping => {
            if client.ping().await? {
                output::print_success("Daemon is alive (PONG)");
            } else {
                output::print_error("Daemon not responding");
            }
        }

        Commands::TileAdded => {
            let resp = client.send("MARK_TILE_ADDED").await?;
            print_result(&resp, "Tile marked as added");
        }
    }

    Ok(())
}

fn print_result(resp: &str, what: &str) {
    match resp.strip_prefix("ERR ") {
        Some(reason) => output::print_error(reason),
        None => output::print_success(&format!("{}: {}", what, resp.trim_start_matches("OK "))),
    }
}

async fn handle_status(client: &IpcClient) -> Result<()> {
    match client.send("STATUS").await {
        Ok(response) => output::print_status(&response),
        Err(_) => output::print_daemon_stopped(),
    }
    Ok(())
}
