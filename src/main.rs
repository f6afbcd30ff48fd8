use anyhow::Context;
use serde::Serialize;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};
use umicro::{Environment, Templater, TemplaterOptions};

#[derive(Serialize, Debug)]
struct Page<'a> {
    title: &'a str,
    test: bool,
    items: Vec<&'a str>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string());
    fmt().with_env_filter(EnvFilter::new(filter)).init();

    let mut args = env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| "./templates".to_string());
    let name = args.next().unwrap_or_else(|| "index.html".to_string());
    let environment: Environment = env::var("UMICRO_ENV")
        .unwrap_or_default()
        .parse()
        .unwrap_or_default();

    let options = TemplaterOptions::new().environment(environment);
    let templater = Arc::new(
        Templater::with_options(&dir, options)
            .with_context(|| format!("open template directory {}", dir))?,
    );

    let mut tasks = Vec::new();
    for i in 0..4 {
        let templater = templater.clone();
        let name = name.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let page = Page {
                title: "Home",
                test: i % 2 == 0,
                items: vec!["Evan", "John", "Jane"],
            };
            templater.render(&name, &page)
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let html = task.await?.with_context(|| format!("render {}", name))?;
        println!("--- render #{} ---\n{}", i, html);
    }
    println!("compiled {} time(s)", templater.compile_count());
    Ok(())
}
