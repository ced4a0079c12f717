use dotenv::dotenv;

use mt2_draft::cli::Repl;
use mt2_draft::context::{self, Settings};
use mt2_draft::engine::DraftEngine;
use mt2_draft::opt::*;
use mt2_draft::session::DraftSession;

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(err) = run().await {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Res<()> {
    let settings = Settings::from_env();
    let context = context::create_context(&settings)?;

    let engine = DraftEngine::load(settings.card_data.as_deref(), settings.rule_data.as_deref())
        .err_to_str()?;

    let session = match context.current_run_id() {
        Some(run_id) => DraftSession::with_run_id(&run_id),
        None => {
            let session = DraftSession::new();
            context.set_current_run_id(session.run_id())?;
            session
        }
    };

    Repl::new(engine, session).main().await.err_to_str()
}
