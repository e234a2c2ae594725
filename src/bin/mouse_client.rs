//! Command-line client for the micromouse node.
//!
//! ```text
//! mouse_client [--address host:port] start <width> <height> <start_row> <start_col> <goal_row> <goal_col>
//! mouse_client [--address host:port] status
//! mouse_client [--address host:port] cancel
//! ```

use micromouse::client::MouseClient;
use micromouse::{Cell, NavError, Result, RunOutcome, RunRequest, ADDRESS};
use tracing::info;

fn usage() -> NavError {
    NavError::Config(
        "usage: mouse_client [--address host:port] (start w h start_row start_col goal_row goal_col | status | cancel)"
            .to_string(),
    )
}

fn parse_numbers(args: &[String]) -> Result<Vec<usize>> {
    args.iter()
        .map(|a| a.parse::<usize>().map_err(|_| usage()))
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mouse_client=info".parse().unwrap()),
        )
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let address = match args.iter().position(|a| a == "--address") {
        Some(i) if i + 1 < args.len() => {
            let address = args.remove(i + 1);
            args.remove(i);
            address
        }
        Some(_) => return Err(usage()),
        None => ADDRESS.to_string(),
    };

    let mut client = MouseClient::connect(&address)?;

    match args.first().map(String::as_str) {
        Some("start") => {
            let numbers = parse_numbers(&args[1..])?;
            let &[width, height, start_row, start_col, goal_row, goal_col] = numbers.as_slice() else {
                return Err(usage());
            };
            let request = RunRequest {
                width,
                height,
                start: Cell::new(start_row, start_col),
                goal: Cell::new(goal_row, goal_col),
            };
            let outcome = client.start_run(&request, |feedback| {
                info!("Step {}: {}", feedback.step_count, feedback.current_cell)
            })?;
            match outcome {
                RunOutcome::Succeeded { path } => {
                    let cells: Vec<String> = path.iter().map(Cell::to_string).collect();
                    println!("Succeeded: {}", cells.join(" "));
                }
                RunOutcome::Failed(reason) => println!("Failed: {:?}", reason),
                RunOutcome::Cancelled => println!("Cancelled"),
            }
        }
        Some("status") => {
            let status = client.status()?;
            match status.current_cell {
                Some(cell) => println!(
                    "{:?} at {} after {} steps",
                    status.state, cell, status.step_count
                ),
                None => println!("{:?}", status.state),
            }
        }
        Some("cancel") => {
            if client.cancel()? {
                println!("Cancellation requested");
            } else {
                println!("No run in progress");
            }
        }
        _ => return Err(usage()),
    }
    Ok(())
}
