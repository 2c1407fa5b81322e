use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = treeops::cli::parse();
    app::run(args)
}
