use anyhow::Result;

mod demo;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let mut args = std::env::args().skip(1);
    let template_path = args.next();
    let config_path = args.next();

    let mut state = demo::DemoState::new(template_path.as_deref(), config_path.as_deref())?;
    state.run()?;

    Ok(())
}
