//! Session smoke tool
//!
//! Loads a document session against a live API and prints per-subsection
//! statuses plus the composite readiness record. Useful for poking at a
//! deployment without a browser:
//!
//! ```text
//! DOCBUILDER_API_URL=https://api.example.test/v1 \
//! DOCBUILDER_TOKEN=... \
//! docbuilder-status <slug> <organization-id>
//! ```

use anyhow::{bail, Context};
use docbuilder_api::HttpApi;
use docbuilder_engine::{Session, SessionConfig};
use docbuilder_model::{navigator, OrganizationId, QuestionFilter};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(slug), Some(org)) = (args.next(), args.next()) else {
        bail!("usage: docbuilder-status <slug> <organization-id>");
    };
    let organization = OrganizationId(org.parse().context("organization id must be numeric")?);

    let base_url =
        std::env::var("DOCBUILDER_API_URL").context("DOCBUILDER_API_URL not set")?;
    let mut api = HttpApi::new(base_url);
    if let Ok(token) = std::env::var("DOCBUILDER_TOKEN") {
        api = api.with_bearer_token(token);
    }

    let session = Session::load(Arc::new(api), &slug, organization, SessionConfig::new())
        .await
        .context("session load failed")?;
    session.refresh_submittable().await;

    let document = session.document();
    println!("document {} ({})", document.slug, document.id);
    println!("  closed: {}", session.is_closed());

    for subsection in navigator::subsections(document, QuestionFilter::All)? {
        println!(
            "  [{:?}] {} ({})",
            session.status_of(subsection.id),
            subsection.name,
            subsection.id,
        );
    }

    let readiness = session.readiness();
    println!("  requirements met: {}", readiness.requirements_met);
    println!("  submittable:      {:?}", readiness.submittable);
    println!("  read-only:        {}", session.read_only());
    println!("  can submit:       {}", session.can_submit());

    Ok(())
}
