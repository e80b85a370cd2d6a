use crate::{api::CreateArticle, app, config::Config, model::Id, prelude::*, views::news_feed};


#[derive(Debug, clap::Args)]
pub(crate) struct Args {
    /// ID of the user the article is attributed to.
    #[clap(long, value_name = "ID")]
    user_id: String,

    /// ID of the category the article belongs to.
    #[clap(long, value_name = "ID")]
    category_id: String,

    #[clap(long)]
    title: String,

    #[clap(long)]
    content: String,

    /// Whether the article is visible in the feed: 'true' or 'false'.
    #[clap(long, required = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    published: bool,

    /// Whether the article is listed before others: 'true' or 'false'.
    #[clap(long, required = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    featured: bool,
}

impl From<&Args> for CreateArticle {
    fn from(args: &Args) -> Self {
        Self {
            user_id: Id::from(args.user_id.as_str()),
            category_id: Id::from(args.category_id.as_str()),
            title: args.title.clone(),
            content: args.content.clone(),
            is_published: args.published,
            is_featured: args.featured,
        }
    }
}

pub(crate) async fn run(args: &Args, config: &Config) -> Result<()> {
    let app = app::bootstrap(config)?;
    let title = news_feed::submit(app.context(), args.into()).await?;
    bunt::println!("{$green+bold}✔{/$} Created article {[bold]}", title);
    Ok(())
}


#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use crate::{
        api::CreateArticle,
        args::{Args, Command},
    };

    #[test]
    fn arguments_map_to_operation() {
        let args = Args::try_parse_from([
            "news-feed", "create-article",
            "--user-id", "u1", "--category-id", "c1",
            "--title", "T", "--content", "C",
            "--published", "true", "--featured", "false",
        ]).unwrap();
        let Command::CreateArticle { args, .. } = args.cmd else {
            panic!("wrong command");
        };

        let op = CreateArticle::from(&args);
        assert_eq!(op.user_id.as_str(), "u1");
        assert_eq!(op.category_id.as_str(), "c1");
        assert_eq!((op.title.as_str(), op.content.as_str()), ("T", "C"));
        assert!(op.is_published);
        assert!(!op.is_featured);
    }
}
