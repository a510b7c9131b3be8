mod app;
mod audio;
mod catalog;
mod config;
mod download;
mod error;
mod handoff;
mod logging;
mod observe;
mod playlist;
mod runtime;
mod session;
#[cfg(test)]
mod testing;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
