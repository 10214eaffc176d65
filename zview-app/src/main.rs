use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zview_config::{AppConfig, ConfigError, TessellationConfig};
use zview_engine::errors::FitError;
use zview_engine::text::FixedAdvanceShaper;
use zview_engine::viewport::Viewport;
use zview_engine::{Scene, TessellationSettings};
use zview_io::{DrawingLoader, JsonDrawingLoader};

mod report;

/// 将解析后的 CAD 图纸转换为图元并适配视口。
#[derive(Debug, Parser)]
#[command(name = "zview", version)]
struct Args {
    /// 解析器导出的 JSON 图纸。
    drawing: PathBuf,
    /// 配置文件路径，缺省时按 `ZVIEW_CONFIG` 与 `./config/default.toml` 查找。
    #[arg(long)]
    config: Option<PathBuf>,
    /// 画布宽度（像素），覆盖配置。
    #[arg(long)]
    width: Option<f64>,
    /// 画布高度（像素），覆盖配置。
    #[arg(long)]
    height: Option<f64>,
    /// 以 JSON 输出场景与视口。
    #[arg(long)]
    json: bool,
}

/// `--json` 模式的输出结构，视口在场景为空时为 `null`。
#[derive(Serialize)]
struct JsonOutput<'a> {
    scene: &'a Scene,
    viewport: Option<&'a Viewport>,
}

fn main() {
    let args = Args::parse();
    let config = load_configuration(args.config.clone());
    init_logging(&config);
    info!("启动 zview");

    if let Err(err) = run(&args, &config) {
        error!(error = %err, "转换失败");
        eprintln!("错误: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let drawing = JsonDrawingLoader::new()
        .load(&args.drawing)
        .with_context(|| format!("无法加载图纸 {}", args.drawing.display()))?;
    info!(
        path = %args.drawing.display(),
        entities = drawing.entity_count(),
        "图纸已加载"
    );

    let settings = tessellation_settings(&config.tessellation);
    let shaper = FixedAdvanceShaper::new(config.text.advance_factor);
    let scene = Scene::build(&drawing, &settings, &shaper);

    let width = args.width.unwrap_or(config.viewport.width);
    let height = args.height.unwrap_or(config.viewport.height);
    let viewport = match scene.fit_viewport(width, height) {
        Ok(viewport) => Some(viewport),
        Err(FitError::EmptyBounds) => {
            warn!("场景没有可见图元，跳过视口适配");
            None
        }
        Err(err) => return Err(err).context("视口适配失败"),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let payload = JsonOutput {
            scene: &scene,
            viewport: viewport.as_ref(),
        };
        serde_json::to_writer_pretty(&mut out, &payload).context("序列化场景失败")?;
        writeln!(out)?;
    } else {
        report::write_summary(&mut out, &scene, viewport.as_ref())?;
    }
    info!(primitives = scene.primitives().len(), "转换完成");
    Ok(())
}

fn tessellation_settings(config: &TessellationConfig) -> TessellationSettings {
    TessellationSettings {
        arc_divisions: config.arc_divisions,
        ellipse_divisions: config.ellipse_divisions,
        spline_bezier_divisions: config.spline_bezier_divisions,
        spline_curve_divisions: config.spline_curve_divisions,
        max_block_depth: config.max_block_depth,
        ..TessellationSettings::default()
    }
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(
                            path = %path.display(),
                            error = %err,
                            "加载默认配置失败，使用内建默认值"
                        );
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

/// 日志写到 stderr，stdout 只保留报告或 JSON。
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
