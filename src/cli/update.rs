use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Record a publication:\n    pblog update posts/hello.md --env prod --id 42\n\n\
                  Mark an environment as known without an id:\n    pblog update posts/hello.md --env staging\n\n\
                  Set slug and date explicitly:\n    pblog update posts/hello.md --env prod --id 42 --slug hello --date 2024-05-01")]
pub struct UpdateArgs {
    /// Markdown post to update in place
    pub post: PathBuf,

    /// Environment the post was published to
    #[arg(long)]
    pub env: String,

    /// Remote id of the post in ENV
    #[arg(long)]
    pub id: Option<i64>,

    /// Slug to record (defaults to the current slug or one derived from the title)
    #[arg(long)]
    pub slug: Option<String>,

    /// Publication date to record (defaults to the current date or today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Encoding of the markdown post
    #[arg(long, short = 'e', env = "PBLOG_ENCODING", default_value = pblog::encoding::DEFAULT_ENCODING)]
    pub encoding: String,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, pblog::validate::DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
