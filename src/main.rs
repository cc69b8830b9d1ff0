#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Interactive star map for a torus galaxy.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// RON snapshot of a parsed turn report. A built-in sample is used if omitted.
    #[arg(long)]
    report: Option<std::path::PathBuf>,

    /// RON map configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Initial camera center as `<galaxy>_<row>_<col>`.
    #[arg(long)]
    center: Option<String>,
}

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    use starmap::config::MapConfig;
    use starmap::report::Report;
    use starmap::torus::{format_position, parse_position};

    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MapConfig::load(path).unwrap_or_else(|e| {
            log::warn!("{e}; using default map config");
            MapConfig::default()
        }),
        None => MapConfig::default(),
    };
    let report = match &args.report {
        Some(path) => Report::load(path).unwrap_or_else(|e| {
            log::warn!("{e}; showing the sample report");
            Report::sample()
        }),
        None => Report::sample(),
    };
    let center = args.center.as_deref().map(parse_position);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Starmap")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "starmap",
        native_options,
        Box::new(move |cc| {
            let app = starmap::StarmapApp::new(cc, report, config, center)
                .with_report_path(args.report)
                .on_select_cell(|xy| log::info!("selected {}", format_position(xy)))
                .on_center_change(|xy| log::debug!("center now {}", format_position(xy)));
            Ok(Box::new(app))
        }),
    )
}

// When compiling to web using trunk:
#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast as _;
    use starmap::config::MapConfig;
    use starmap::report::Report;

    // Redirect `log` message to `console.log` and friends:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("no document to mount the map in");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("the_canvas_id")
            .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            log::error!("the_canvas_id is missing or not a canvas");
            return;
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| {
                    Ok(Box::new(starmap::StarmapApp::new(
                        cc,
                        Report::sample(),
                        MapConfig::default(),
                        None,
                    )))
                }),
            )
            .await;

        // Remove the loading text and spinner:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => loading_text.remove(),
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p> The app has crashed. See the developer console for details. </p>",
                    );
                    log::error!("failed to start eframe: {e:?}");
                }
            }
        }
    });
}
