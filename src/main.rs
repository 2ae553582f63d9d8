use chrono::{Local, NaiveTime, TimeDelta};
use serde_json::json;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

use ritual::kernel::scheduler::fold;
use ritual::{Candidate, Clock, HostSignal, InteractionSignal, Reactor, RitualConfig, SideEffect};

const CATALOG: [&str; 8] = [
    "linen shirt",
    "wool coat",
    "denim jacket",
    "silk scarf",
    "canvas sneakers",
    "leather boots",
    "cotton tee",
    "rain shell",
];

/// Simulated day: walks the clock from 03:30 through the next morning in
/// 30-minute jumps, opening and sealing the ritual whenever the window opens.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match std::env::args().nth(1) {
        Some(path) => RitualConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => RitualConfig::default(),
    };
    tracing::info!("Ritual simulation booting with {:?}", config);

    let clock = Clock::system();
    let start = Local::now()
        .date_naive()
        .and_time(NaiveTime::from_hms_opt(3, 30, 0).unwrap_or(NaiveTime::MIN));
    clock.simulate_local_time(start);

    let mut reactor = Reactor::new(&config, clock.clone())?;
    let _sub = reactor.machine.subscribe(|state| {
        tracing::info!("[STATE] {:?} rev {}", state.phase, state.revision);
    });

    for _ in 0..52 {
        for signal in reactor.tick_step() {
            match signal {
                HostSignal::DayBegan => tracing::info!("[HOST] New ritual day at {}", clock.now()),
                HostSignal::WindowClosed => tracing::info!("[HOST] Window closed at {}", clock.now()),
                HostSignal::WindowOpened { minutes_remaining } => {
                    tracing::info!("[HOST] Window open, {} minutes left", minutes_remaining);
                    let mood = reactor.machine.snapshot().mood;
                    let work = fold(
                        CATALOG.iter().enumerate(),
                        Vec::new(),
                        move |mut acc: Vec<Candidate>, (i, name)| {
                            let score = ((i as f32 * 0.37 + mood) % 1.0) as f64;
                            if score > 0.3 && acc.len() < 3 {
                                acc.push(Candidate::with_meta(
                                    Uuid::new_v4().to_string(),
                                    json!({ "name": name, "score": score }),
                                ));
                            }
                            Ok(acc)
                        },
                    );
                    if let Err(e) = reactor.prepare_ritual(work).await {
                        tracing::warn!("[HOST] Could not open ritual: {}", e);
                        continue;
                    }

                    reactor.machine.set_active_index(1);
                    reactor.machine.set_interaction_signal(InteractionSignal::Right);
                    let chosen = reactor.machine.snapshot().active_candidate().map(|c| c.id.clone());
                    if let Some(id) = chosen {
                        reactor.machine.seal(id)?;
                    }
                }
                HostSignal::Effect(effect) => record(&effect)?,
            }
        }

        // effects raised while handling this tick's signals
        for effect in reactor.machine.drain_effects() {
            record(&effect)?;
        }

        clock.advance(TimeDelta::minutes(30));
    }

    let metrics = reactor.machine.telemetry.snapshot();
    tracing::info!(
        "Simulation done: {} transitions, {} seals, {} rejections",
        metrics.transitions,
        metrics.seals,
        metrics.rejections
    );
    clock.reset_offset();
    Ok(())
}

fn record(effect: &SideEffect) -> anyhow::Result<()> {
    match effect {
        SideEffect::RitualSealed { .. } => {
            println!("[RECORD] {}", serde_json::to_string(effect)?);
        }
    }
    Ok(())
}
