use anyhow::{Context, Result};
use clap::Parser;
use eslip::app::cli::{Cli, Command};
use eslip::app::terminal::{drain_toasts, StdoutClipboard, TerminalFormView, TerminalReceiptView};
use eslip::models::payment::FormFields;
use eslip::services::account_copy::AccountCopier;
use eslip::services::{
    HttpPaymentApi, PaymentApi, PaymentFormController, ReceiptLoader, ReceiptOutcome,
    SubmitOutcome, ToastManager,
};
use eslip::utils::money;
use eslip::UniqueCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config().context("failed to load configuration")?;
    info!("Using payment API at {}", config.api_base_url);

    match cli.command {
        Command::Code => {
            let api = HttpPaymentApi::new(&config)?;
            let code = api.generate_code().await.context("failed to generate unique code")?;
            println!("{}", code);
        }

        Command::Preview { amount, code } => {
            let code = UniqueCode::new(code)
                .with_context(|| format!("unique code must be at most {}", UniqueCode::MAX))?;
            println!("Jumlah          : Rp {}", money::to_display(&amount));
            println!("Kode unik       : {}", code);
            println!("Total transfer  : Rp {}", money::to_total_with_code(&amount, code));
        }

        Command::Pay { nama, email, nim, prodi, semester, amount } => {
            let api = Arc::new(HttpPaymentApi::new(&config)?);
            let view = Arc::new(TerminalFormView::new(
                FormFields { nama, email, nim, prodi, semester },
                &amount,
            ));
            let toasts = ToastManager::new();
            let mut events = toasts.subscribe();
            let form = PaymentFormController::new(view.clone(), api, toasts)
                .with_redirect_delay(config.redirect_delay());

            form.init().await;
            form.on_amount_input();
            form.on_amount_blur();
            drain_toasts(&mut events);
            view.print_summary();

            let outcome = form.submit().await;
            drain_toasts(&mut events);

            match outcome {
                SubmitOutcome::Redirecting { .. } => {
                    // Let the scheduled navigation fire before the runtime goes away.
                    tokio::time::sleep(config.redirect_delay() + Duration::from_millis(50)).await;
                }
                SubmitOutcome::Failed { message } => anyhow::bail!(message),
                SubmitOutcome::Submitted | SubmitOutcome::Ignored => {}
            }
        }

        Command::Receipt { page } => {
            let api = Arc::new(HttpPaymentApi::new(&config)?);
            let loader = ReceiptLoader::new(Arc::new(TerminalReceiptView), api);

            match loader.load(&page).await {
                ReceiptOutcome::Loaded(_) => {}
                ReceiptOutcome::AccessDenied => anyhow::bail!("receipt page needs an id"),
                ReceiptOutcome::Failed => anyhow::bail!("could not load receipt"),
            }
        }

        Command::Copy { text } => {
            let copier = AccountCopier::new(Arc::new(StdoutClipboard), "fas fa-copy");
            copier.copy(&text).await;
        }
    }

    Ok(())
}
