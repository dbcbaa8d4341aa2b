//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-core`: 运行 fx-core 覆盖率
//! - `config-check`: 检查引擎配置文件
//! - `sim-smoke`: 运行一次无窗口模拟并检查输出

use std::path::Path;
use std::process::{Command, ExitCode};

use fx_core::EngineConfig;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    let status = cmd.status();
    match status {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;
        }
        "cov-core" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "fx-core", "--all-features", "--html"]);
            run("cargo llvm-cov -p fx-core --all-features --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "config-check" => {
            let path = args.next().unwrap_or_else(|| "fx.json".to_string());
            config_check(Path::new(&path))?;
        }
        "sim-smoke" => {
            sim_smoke()?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-core        运行 fx-core 覆盖率报告
  config-check    检查引擎配置文件
  sim-smoke       运行无窗口模拟并检查统计输出

CONFIG-CHECK:
  cargo xtask config-check [path]

  不带参数：检查 workspace 根目录下的 fx.json

  检查内容：
    - JSON 语法与字段类型
    - 数值范围（闪电参数、轨迹上限、帧间隔上限）
    - 合并后的预算表

ALIASES (in .cargo/config.toml):
  cargo check-all    -> cargo xtask check-all
  cargo cov-core     -> cargo xtask cov-core
  cargo config-check -> cargo xtask config-check
"#
    );
}

//=============================================================================
// config-check 命令实现
//=============================================================================

/// 检查配置文件
///
/// `EngineConfig::load` 出错时会静默回退默认值，这里要求文件本身可解析。
fn config_check(path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("无法读取 {}: {e}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{}: 解析失败 - {e}", path.display()))?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;

    let budget = config.budget();
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("配置: {}", path.display());
    eprintln!("设备档位: {:?}", config.device_class());
    eprintln!("预算: {}", serde_json::to_string(&budget)?);
    eprintln!("轨迹上限: {}", config.trail_capacity);
    eprintln!("帧间隔上限: {} ms", config.max_frame_delta_ms);
    eprintln!();
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

//=============================================================================
// sim-smoke 命令实现
//=============================================================================

/// 以固定种子运行 fx-sim，检查输出统计是否在预算内
fn sim_smoke() -> anyhow::Result<()> {
    eprintln!("\n==> cargo run -p fx-headless -- --seed 7 --frames 600");
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "fx-headless", "--", "--seed", "7", "--frames", "600"])
        .output()?;
    if !output.status.success() {
        anyhow::bail!(
            "fx-sim 运行失败: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let particles = &summary["particles"];
    let budget = &particles["budget"];

    let mut problems = Vec::new();
    if let Some(counts) = particles["counts"].as_object() {
        for (kind, count) in counts {
            let limit = budget[kind].as_u64().unwrap_or(0);
            if count.as_u64().unwrap_or(0) > limit {
                problems.push(format!("{kind}: {count} 超出预算 {limit}"));
            }
        }
    } else {
        problems.push("输出缺少 particles.counts".to_string());
    }

    if summary["clicks"].as_u64().unwrap_or(0) == 0 {
        problems.push("没有发生任何点击".to_string());
    }
    if summary["tweensCompleted"].as_u64().unwrap_or(0) == 0 {
        problems.push("没有补间完成".to_string());
    }

    if problems.is_empty() {
        eprintln!("✅ 模拟输出正常");
        Ok(())
    } else {
        for p in &problems {
            eprintln!("[ERROR] {p}");
        }
        anyhow::bail!("模拟检查发现 {} 个问题", problems.len())
    }
}
