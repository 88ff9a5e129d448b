use clap::Subcommand;

use crate::{fmt_time, truncate};

/// Sub-commands available under `news`.
#[derive(Debug, Subcommand)]
pub enum NewsCommands {
    /// Show the newest stored articles
    List {
        /// Maximum number of articles to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_news_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let articles = agrinews_db::list_news(pool, limit).await?;
    if articles.is_empty() {
        println!("no articles stored; run `ingest run` first");
        return Ok(());
    }

    for article in &articles {
        println!("{}  {}", fmt_time(article.created_at), article.title);
        println!("    {}", truncate(&article.description, 120));
        println!("    {}", article.url);
    }
    Ok(())
}
