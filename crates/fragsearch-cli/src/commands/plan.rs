use crate::cli::SearchArgs;
use crate::config::build_config;
use crate::error::Result;
use fragsearch::engine::invoker::SearchInvoker;
use fragsearch::workflows;
use tracing::info;

pub fn run(args: SearchArgs) -> Result<()> {
    let config = build_config(&args)?;

    info!("Planning fragment search without running it...");
    let (fragments, jobs) =
        workflows::replace::plan(&config.request, &config.search, &config.decomposer)?;

    println!("Fragments:");
    for fragment in &fragments {
        println!("  {:3}: {}", fragment.index, fragment.structure);
    }
    println!("Databases:");
    for (index, database) in config.request.databases.iter().enumerate() {
        println!("  {:3}: {}", index, database);
    }

    let invoker = SearchInvoker::new(&config.search, None);
    println!("Jobs ({}):", jobs.len());
    for job in &jobs {
        println!("  {}: {}", job.prefix, invoker.command_line(job).join(" "));
    }
    println!(
        "Combined table would be written to: {}",
        config.search.output_path.display()
    );

    Ok(())
}
