/*
 *  main.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Host binary: paces the marquee, reads commands, draws to the terminal
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::io;

use anyhow::Context;
use env_logger::Env;
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use ledmarquee::app::{open_store, MarqueeApp, Outcome};
use ledmarquee::command::Command;
use ledmarquee::config::{self, Config};
use ledmarquee::pacer::AutoPacer;
use ledmarquee::persist::SettingsPersister;
use ledmarquee::settings::SettingsPatch;
use ledmarquee::term::TerminalSink;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
#[cfg(unix)]
async fn signal_handler() -> anyhow::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

/// Set up the marquee, run the frame loop, then close down. Settings are
/// flushed and the terminal restored even when the loop fails.
async fn run(cfg: &Config, frame_limit: Option<u64>) -> anyhow::Result<()> {
    let store = open_store(cfg);
    let persister = SettingsPersister::new(store);
    let load = persister.spawn_load();
    let mut app = MarqueeApp::new(cfg, persister, tokio::time::Instant::now().into_std());

    let mut sink = if cfg.headless() {
        None
    } else {
        let mut sink = TerminalSink::stdout();
        sink.enter().context("terminal setup failed")?;
        Some(sink)
    };

    let result = frame_loop(&mut app, sink.as_mut(), load, cfg.fps(), frame_limit).await;
    app.close(sink.as_mut(), result).await
}

/// Pace, render, present; commands and the startup load are handled between
/// frames.
async fn frame_loop(
    app: &mut MarqueeApp,
    mut sink: Option<&mut TerminalSink<io::Stdout>>,
    mut load: JoinHandle<Option<SettingsPatch>>,
    fps: u32,
    frame_limit: Option<u64>,
) -> anyhow::Result<()> {
    let mut loading = true;
    let mut pacer = AutoPacer::new(fps, fps, (fps / 4).max(1));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut frames: u64 = 0;

    let signals = signal_handler();
    tokio::pin!(signals);

    loop {
        tokio::select! {
            res = &mut signals => {
                if let Err(e) = res {
                    error!("signal handling failed: {}", e);
                }
                return Ok(());
            }

            res = &mut load, if loading => {
                loading = false;
                let patch = res.unwrap_or_else(|e| {
                    error!("settings load task failed: {}", e);
                    None
                });
                app.accept_loaded(patch, tokio::time::Instant::now().into_std());
            }

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match line.parse::<Command>() {
                        Ok(command) => match app.execute(command, tokio::time::Instant::now().into_std()) {
                            Outcome::Quit => return Ok(()),
                            Outcome::Reply(reply) => info!("{}", reply),
                            Outcome::Continue => {}
                        },
                        Err(e) => warn!("{}", e),
                    },
                    Ok(None) => {
                        debug!("stdin closed");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        stdin_open = false;
                    }
                }
            }

            now = pacer.tick() => {
                let state = app.render_frame(now.into_std());
                match sink.as_deref_mut() {
                    Some(sink) => {
                        let started = std::time::Instant::now();
                        app.present(sink).context("terminal write failed")?;
                        pacer.record_flush_ms(started.elapsed().as_secs_f32() * 1000.0);
                    }
                    None if frames % u64::from(fps) == 0 => {
                        debug!(
                            "frame {} offset {:.1} font {:.0} color {} text {:.2} border {:.2}",
                            frames, state.offset, state.font_size, state.color,
                            state.text_opacity, state.border_opacity
                        );
                    }
                    None => {}
                }
                frames += 1;
                if frame_limit.is_some_and(|limit| frames >= limit) {
                    info!("rendered {} frames, stopping", frames);
                    return Ok(());
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, cli) = config::load().context("configuration")?;

    if cli.dump_config {
        println!("{}", config::dump_config(&cfg)?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("This {} worth the Squeeze", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);
    info!(
        "canvas {}x{} @ {} fps, grid {}, {}",
        cfg.width(), cfg.height(), cfg.fps(), cfg.grid(),
        if cfg.headless() { "headless" } else { "terminal" }
    );

    run(&cfg, cli.frames).await?;
    info!("{} stopped", env!("CARGO_PKG_NAME"));
    Ok(())
}
