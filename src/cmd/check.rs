//! A subcommand making sure various things are working. Useful after changing
//! the configuration or updating the server, as it catches most problems
//! before a page is opened.

use crate::{
    api::{CreateArticle, IntrospectedField, MutationArguments, Operation, SiteInfo},
    args,
    client::{FetchPolicy, GraphQlClient},
    config::Config,
    load_config_and_init_logger,
    prelude::*,
};


pub(crate) async fn run(shared: &args::Shared, args: &args::Args) -> Result<()> {
    let config = load_config_and_init_logger(shared, args)
        .context("failed to load config: cannot proceed with `check` command")?;


    // Perform main checks
    info!("Starting to verify various things...");
    let client = GraphQlClient::from_config(&config.graphql);
    let server_checks = match &client {
        Ok(client) => Some((
            check_endpoint(client, &config).await,
            check_create_article_arguments(client).await,
        )),
        Err(_) => None,
    };
    info!("Done verifing various things");


    // Print summary after all log output
    let mut any_errors = false;
    println!();
    bunt::println!("{$bold+blue+intense}Summary{/$}");
    println!();
    print_outcome(&mut any_errors, "Load configuration", &Ok(()));
    print_outcome(&mut any_errors, "Create GraphQL client", &client);
    if let Some((endpoint, schema)) = &server_checks {
        print_outcome(&mut any_errors, "Connection to GraphQL endpoint", endpoint);
        print_outcome(&mut any_errors, "Arguments of `createArticle`", schema);
    }

    println!();
    if any_errors {
        bunt::println!("{$red+intense}➡  Errors have occured!{/$}");
        std::process::exit(1);
    } else {
        bunt::println!("{$green+intense}⮕  Everything OK{/$} \
            {$dimmed}(the server probably works with this client){/$}");
        println!("   ");
        Ok(())
    }
}

fn print_outcome<T>(any_errors: &mut bool, label: &str, result: &Result<T>) {
    match result {
        Ok(_) => {
            bunt::println!(" ▸ {[bold+intense]}  {$green+bold}✔ ok{/$}", label);
        }
        Err(e) => {
            *any_errors = true;
            bunt::println!(" ▸ {[bold+intense]}  {$red+bold}✘ error{/$}", label);
            bunt::println!("      {$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
            println!();
            if e.chain().len() > 1 {
                bunt::println!("      {$red+italic}Caused by:{/$}");
            }

            for (i, cause) in e.chain().skip(1).enumerate() {
                print!("       {: >1$}", "", i * 2);
                println!("‣ {cause}");
            }
            println!();
        }
    }
}

async fn check_endpoint(client: &GraphQlClient, config: &Config) -> Result<()> {
    let site = client.execute_with(&SiteInfo {}, FetchPolicy::NetworkOnly)
        .await
        .with_context(|| format!("`site` query to {} failed", config.graphql.endpoint))?;

    match site {
        Some(site) => info!("Server reports site '{}'", site.name),
        None => warn!("Server is reachable, but reports no site"),
    }
    Ok(())
}

async fn check_create_article_arguments(client: &GraphQlClient) -> Result<()> {
    let mutation_type = client.execute_with(&MutationArguments {}, FetchPolicy::NetworkOnly)
        .await
        .context("failed to introspect schema (is introspection disabled?)")?
        .mutation_type
        .ok_or_else(|| anyhow!("schema has no mutations"))?;
    debug!("Root mutation type: {}", mutation_type.name.as_deref().unwrap_or("<unnamed>"));

    let field = mutation_type.fields
        .unwrap_or_default()
        .into_iter()
        .find(|f| f.name == CreateArticle::ROOT_FIELD)
        .ok_or_else(|| anyhow!("schema has no mutation `{}`", CreateArticle::ROOT_FIELD))?;

    compare_arguments(&field)
}

/// Checks that the server accepts exactly the arguments we send, and that we
/// send every argument the server requires.
fn compare_arguments(field: &IntrospectedField) -> Result<()> {
    let ours = CreateArticle::ARGUMENTS;
    let theirs = field.args.iter().map(|a| a.name.as_str()).collect::<Vec<_>>();
    let described = field.args.iter()
        .map(|a| format!("{}: {}", a.name, a.ty.base_name().unwrap_or("?")))
        .collect::<Vec<_>>();
    debug!("Server arguments of `{}`: {}", field.name, described.join(", "));

    let unknown = ours.iter().filter(|a| !theirs.contains(*a)).copied().collect::<Vec<_>>();
    let missing = field.args.iter()
        .filter(|a| a.ty.is_non_null() && !ours.iter().any(|o| *o == a.name))
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>();

    match (unknown.is_empty(), missing.is_empty()) {
        (true, true) => Ok(()),
        (false, true) => bail!(
            "server does not know the argument(s) {} (it accepts: {})",
            unknown.join(", "),
            theirs.join(", "),
        ),
        (true, false) => bail!("server requires argument(s) {} we never send", missing.join(", ")),
        (false, false) => bail!(
            "argument mismatch: we send {} which the server does not know, \
                and it requires {} which we do not send",
            unknown.join(", "),
            missing.join(", "),
        ),
    }
}
