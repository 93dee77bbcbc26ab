use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use postdesk::api::{ApiClient, ResourceApi};
use postdesk::config::{Config, ConfigStore};
use postdesk::logging;
use postdesk::manager::{PostListView, PostsManager};
use postdesk::model::{CommentId, NewPost, PostPatch};
use postdesk::sync::{with_page_size, AddressBar, MemoryHistory};

#[derive(Parser)]
#[command(name = "postdesk")]
#[command(about = "Administer posts, comments and users of a DummyJSON-style API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: <config dir>/postdesk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overriding the config file and POSTDESK_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts for a URL-style filter query (e.g. "skip=10&sortBy=title")
    Posts {
        #[arg(default_value = "")]
        query: String,
    },
    /// Create a post
    PostAdd {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        user_id: i64,
    },
    /// Edit the title and/or body of a post listed under QUERY
    PostEdit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Delete a post listed under QUERY
    PostDelete {
        id: i64,
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Show the comments of a post
    Comments { post_id: i64 },
    /// Comment on a post
    CommentAdd {
        post_id: i64,
        #[arg(long)]
        body: String,
        #[arg(long)]
        user_id: i64,
    },
    /// Like a comment (client-side only, the API does not store likes)
    CommentLike { post_id: i64, comment_id: i64 },
    /// Show a user profile
    User { id: i64 },
    /// List post tags
    Tags,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();

    let path = cli.config.unwrap_or_else(Config::config_path);
    let store = ConfigStore::open(path)?;
    let mut config = store.get();
    if let Some(url) = cli.base_url {
        config.api.base_url = Some(url);
        config.validate()?;
    }
    tracing::debug!(
        path = %store.path().display(),
        base_url = config.api.effective_base_url(),
        "Configuration loaded"
    );

    let api: Arc<dyn ResourceApi> = Arc::new(ApiClient::from_config(&config.api)?);
    run(cli.command, api, &config).await
}

async fn run(command: Commands, api: Arc<dyn ResourceApi>, config: &Config) -> Result<()> {
    match command {
        Commands::Posts { query } => {
            let mut manager = mount(api, &query, config);
            let view = manager.load_posts().await?;
            println!("?{}", manager.address_bar().query());
            print_posts(&view);
        }
        Commands::PostAdd {
            title,
            body,
            user_id,
        } => {
            let mut manager = mount(api, "", config);
            manager.load_posts().await?;
            manager.open_add_post();
            let post = manager
                .create_post(NewPost {
                    title,
                    body,
                    user_id,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&post)?);
        }
        Commands::PostEdit {
            id,
            title,
            body,
            query,
        } => {
            let mut manager = mount(api, &query, config);
            let view = manager.load_posts().await?;
            if let Some(post) = view.posts.iter().find(|post| post.id == id) {
                manager.open_edit_post(post.clone());
            }
            let post = manager.update_post(id, PostPatch { title, body }).await?;
            println!("{}", serde_json::to_string_pretty(&post)?);
        }
        Commands::PostDelete { id, query } => {
            let mut manager = mount(api, &query, config);
            manager.load_posts().await?;
            manager.delete_post(id).await?;
            println!("Deleted post {id}");
        }
        Commands::Comments { post_id } => {
            let mut manager = mount(api, "", config);
            let page = manager.load_comments(post_id).await?;
            for comment in &page.comments {
                println!(
                    "{}\t{}\t{}\t{}",
                    comment.id, comment.likes, comment.user.username, comment.body
                );
            }
            println!("{} comment(s)", page.total);
        }
        Commands::CommentAdd {
            post_id,
            body,
            user_id,
        } => {
            let mut manager = mount(api, "", config);
            manager.load_comments(post_id).await?;
            manager.open_add_comment(post_id);
            let comment = manager.add_comment(body, user_id).await?;
            println!("{}", serde_json::to_string_pretty(&comment)?);
        }
        Commands::CommentLike {
            post_id,
            comment_id,
        } => {
            let mut manager = mount(api, "", config);
            manager.load_comments(post_id).await?;
            let comment = manager
                .like_comment_once(post_id, &CommentId::from(comment_id))
                .await?;
            println!("{}", serde_json::to_string_pretty(&comment)?);
        }
        Commands::User { id } => {
            let manager = mount(api, "", config);
            let user = manager.open_user_profile(id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Commands::Tags => {
            let manager = mount(api, "", config);
            for tag in manager.load_tags().await? {
                println!("{}\t{}", tag.slug, tag.name);
            }
        }
    }
    Ok(())
}

/// Builds a manager whose address bar starts at `query`. The configured page
/// size applies when the query does not pick a limit.
fn mount(api: Arc<dyn ResourceApi>, query: &str, config: &Config) -> PostsManager<MemoryHistory> {
    let query = with_page_size(query, config.list.page_size);
    let mut manager = PostsManager::new(api, MemoryHistory::new(&query), &config.list.user_select);
    manager.mount();
    manager
}

fn print_posts(view: &PostListView) {
    for post in &view.posts {
        let author = post
            .author
            .as_ref()
            .map(|author| author.username.as_str())
            .unwrap_or("-");
        println!("{}\t{}\t{}\t{}", post.id, post.likes(), author, post.title);
    }
    println!("{} of {} post(s)", view.posts.len(), view.total);
}
