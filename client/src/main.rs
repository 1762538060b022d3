use clap::Parser;
use client::game::GameConfig;
use client::input::ScriptedInput;
use client::network::{Client, ClientConfig};
use log::{error, info};
use shared::WeaponSpec;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Weapon to spawn with
    #[arg(short = 'w', long, default_value = "ump47")]
    weapon: String,

    /// Simulation ticks per second
    #[arg(short = 't', long, default_value = "60")]
    tick_rate: u32,

    /// Ticks between trigger pulls (0 never fires)
    #[arg(short = 'f', long, default_value = "10")]
    fire_every: u32,

    /// Ticks between reload presses (0 never reloads)
    #[arg(long, default_value = "0")]
    reload_every: u32,

    /// Rounds in the reserve at spawn
    #[arg(short = 'r', long, default_value = "100")]
    reserve: u32,

    /// Walk forward at this fraction of full speed
    #[arg(long, default_value = "0.0")]
    walk: f32,

    /// Turn at this many radians per second
    #[arg(long, default_value = "0.0")]
    turn_rate: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let Some(weapon) = WeaponSpec::by_name(&args.weapon) else {
        let known: Vec<&str> = WeaponSpec::all().iter().map(|spec| spec.name).collect();
        return Err(format!("Unknown weapon '{}' (known: {})", args.weapon, known.join(", ")).into());
    };

    let config = ClientConfig {
        game: GameConfig {
            weapon: *weapon,
            starting_reserve: args.reserve,
            ..GameConfig::default()
        },
        tick_rate: args.tick_rate,
        turn_rate: args.turn_rate,
        ..ClientConfig::default()
    };
    let input = ScriptedInput::new(args.fire_every, args.reload_every).with_forward(args.walk);

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Weapon: {}, firing every {} ticks", weapon.name, args.fire_every);

    let mut client = Client::new(&args.server, config, input).await?;

    tokio::select! {
        result = client.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, leaving");
        }
    }

    if let Err(e) = client.disconnect().await {
        error!("Failed to send disconnect: {}", e);
    }

    Ok(())
}
