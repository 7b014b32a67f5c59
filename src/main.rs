#![allow(clippy::cargo_common_metadata)]
use anyhow::Result;
use commander::{
    Command, Commander, CommanderConfig, Context, Handler, command_args, setup_logging,
};
use std::io::Write;

command_args! {
    pub struct StartEngineArgs {
        pub quiet: bool => { default: "false", usage: "Start the engine in quiet mode" },
    }
}

command_args! {
    pub struct AcArgs {
        pub temperature: i64 => { default: "22", usage: "Temperature in Celsius" },
        pub fan_speed: i64 => { flag: "fanspeed", default: "3", usage: "Fan speed (1-5)" },
    }
}

command_args! {
    pub struct HeatArgs {
        pub temperature: i64 => { default: "20", usage: "Temperature in Celsius" },
    }
}

fn main() -> Result<()> {
    setup_logging(std::env::var_os("CARCTL_DEBUG").is_some())?;

    let mut cmdr = Commander::new().with_config(CommanderConfig::from_env())?;

    cmdr.add_category("Engine")
        .register(Command::new(
            "start",
            "Starts the car engine",
            Handler::structured(start_engine),
        ))?
        .register(Command::new(
            "stop",
            "Stops the car engine",
            Handler::niladic(stop_engine),
        ))?;

    cmdr.add_category("Climate")
        .register(Command::new(
            "ac",
            "Controls the air conditioning",
            Handler::structured(air_conditioning),
        ))?
        .register(Command::new(
            "heat",
            "Controls the heating system",
            Handler::structured(heating),
        ))?;

    cmdr.add_category("Information")
        .register(Command::new(
            "status",
            "Displays the car's current status",
            Handler::niladic(status),
        ))?
        .register(Command::new("fuel", "Shows fuel level", Handler::niladic(fuel)))?;

    if let Err(e) = cmdr.run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

fn say(ctx: &mut Context<'_>, text: &str) {
    if let Err(e) = writeln!(ctx.output(), "{text}") {
        tracing::warn!("Failed to write output: {}", e);
    }
}

fn start_engine(ctx: &mut Context<'_>, args: StartEngineArgs) {
    if args.quiet {
        say(ctx, "Quietly starting the car engine...");
    } else {
        say(ctx, "Starting the car engine... VROOM!");
    }
}

fn stop_engine(ctx: &mut Context<'_>) {
    say(ctx, "Stopping the car engine...");
}

fn air_conditioning(ctx: &mut Context<'_>, args: AcArgs) {
    say(
        ctx,
        &format!(
            "Setting AC temperature to {}°C with fan speed {}",
            args.temperature, args.fan_speed
        ),
    );
}

fn heating(ctx: &mut Context<'_>, args: HeatArgs) {
    say(
        ctx,
        &format!("Setting heating temperature to {}°C", args.temperature),
    );
}

fn status(ctx: &mut Context<'_>) {
    say(
        ctx,
        "Car Status:\n- Engine: Running\n- Speed: 0 km/h\n- Temperature: 22°C",
    );
}

fn fuel(ctx: &mut Context<'_>) {
    say(ctx, "Fuel level: 75%");
}
