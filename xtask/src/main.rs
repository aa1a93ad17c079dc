use anyhow::Result;
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "Shareit 开发任务自动化")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建所有组件 (release)
    Build,
    /// 运行服务 (开发模式)
    Dev {
        /// 日志级别 (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "debug")]
        log_level: String,
    },
    /// 分享文件或目录并启动服务
    Share {
        /// 要分享的路径
        path: String,
    },
    /// 删除上传目录
    Cleanup,
    /// 打包发布 (tar.gz)
    Dist,
    /// 运行测试
    Test,
    /// 运行测试并生成覆盖率报告
    Coverage,
    /// 清理构建产物
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    // 确保在项目根目录执行
    let project_root = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .map_or_else(std::env::current_dir, Ok)?;
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build => build(&sh)?,
        Commands::Dev { log_level } => dev(&sh, &log_level)?,
        Commands::Share { path } => share(&sh, &path)?,
        Commands::Cleanup => cleanup(&sh)?,
        Commands::Dist => dist(&sh)?,
        Commands::Test => test(&sh)?,
        Commands::Coverage => coverage(&sh)?,
        Commands::Clean => clean(&sh)?,
    }

    Ok(())
}

fn build(sh: &Shell) -> Result<()> {
    println!("🔨 构建所有组件...");
    cmd!(sh, "cargo build --release -p shareit-server -p shareit-cli").run()?;
    println!("✅ 构建完成");
    Ok(())
}

fn dev(sh: &Shell, log_level: &str) -> Result<()> {
    println!("🚀 启动开发模式服务...");
    let rust_log = format!("info,shareit_core={log_level},shareit_server={log_level}");
    let _env = sh.push_env("RUST_LOG", rust_log);
    cmd!(sh, "cargo run -p shareit-server").run()?;
    Ok(())
}

fn share(sh: &Shell, path: &str) -> Result<()> {
    // 先构建，启动器需要同目录下的 shareit-server
    cmd!(sh, "cargo build -p shareit-server -p shareit-cli").run()?;
    cmd!(sh, "target/debug/shareit share {path}").run()?;
    Ok(())
}

fn cleanup(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo run -p shareit-cli -- cleanup").run()?;
    Ok(())
}

fn dist(sh: &Shell) -> Result<()> {
    println!("📦 打包发布...");

    build(sh)?;

    let version = env!("CARGO_PKG_VERSION");
    let dist_name = format!("shareit-{version}-linux-x86_64");
    // dist/ 是前端构建目录，打包输出放在 target/package
    let out_dir = format!("target/package/{dist_name}");

    cmd!(sh, "mkdir -p {out_dir}").run()?;
    cmd!(sh, "cp target/release/shareit-server {out_dir}/").run()?;
    cmd!(sh, "cp target/release/shareit {out_dir}/").run()?;
    if sh.path_exists("dist") {
        cmd!(sh, "cp -r dist {out_dir}/").run()?;
    }
    if sh.path_exists("README.md") {
        cmd!(sh, "cp README.md {out_dir}/").run()?;
    }

    sh.change_dir("target/package");
    cmd!(sh, "tar -czvf {dist_name}.tar.gz {dist_name}").run()?;

    println!("✅ 打包完成: target/package/{dist_name}.tar.gz");
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    println!("🧪 运行测试...");
    cmd!(sh, "cargo test --workspace").run()?;
    println!("✅ 测试完成");
    Ok(())
}

fn coverage(sh: &Shell) -> Result<()> {
    println!("📊 运行测试覆盖率分析...");

    // 检查 cargo-tarpaulin 是否安装
    if cmd!(sh, "cargo tarpaulin --version").run().is_err() {
        println!("📦 安装 cargo-tarpaulin...");
        cmd!(sh, "cargo install cargo-tarpaulin").run()?;
    }

    println!("🔍 分析中...");
    cmd!(
        sh,
        "cargo tarpaulin --packages shareit-core --out Html --output-dir target/coverage"
    )
    .run()?;

    println!("✅ 覆盖率报告已生成");
    println!("   HTML 报告: target/coverage/tarpaulin-report.html");
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    println!("🧹 清理构建产物...");
    cmd!(sh, "cargo clean").run()?;
    println!("✅ 清理完成");
    Ok(())
}
