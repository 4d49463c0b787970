pub mod brd;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod session;
pub mod store;

use cli::{ Args, Command };
use config::settings::{ initialize_app_config, AppConfig };
use llm::chat::new_client as new_chat_client;
use log::{ info, warn };
use server::Server;
use session::Session;
use std::error::Error;
use store::ProjectStore;

fn build_session(config: &AppConfig) -> Session {
    Session::new(ProjectStore::new(&config.project_dir))
        .with_temperature(config.temperature)
        .with_default_kpis(config.default_kpis.clone())
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = initialize_app_config(&args)?;

    info!("--- Core Configuration ---");
    info!("Settings File: {}", args.settings);
    info!("Project Directory: {}", config.project_dir.display());
    info!("Chat LLM Type: {}", config.llm.llm_type);
    info!("Chat Model: {}", config.llm.completion_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", config.llm.base_url.as_deref().unwrap_or("adapter default"));
    info!("Chat API Key Set: {}", config.llm.api_key.is_some());
    info!("Temperature: {}", config.temperature);
    info!("Default KPIs: {}", config.default_kpis.join(", "));
    info!("-------------------------");

    let mut session = build_session(&config);

    match args.command {
        Command::Projects => {
            let projects = session.list_projects()?;
            if projects.is_empty() {
                println!("No projects found.");
            }
            for project in projects {
                println!("{}", project);
            }
        }
        Command::New { name } => {
            let project_id = session.new_project(name.as_deref())?;
            println!("{}", project_id);
        }
        Command::History { project } => {
            session.select_project(&project)?;
            cli::repl::print_history(session.history());
        }
        Command::Chat { project, message } => {
            let mut session = session.with_chat_client(new_chat_client(&config.llm)?);
            session.select_project(&project)?;
            match message {
                Some(message) => {
                    let reply = session.send_message(&message).await?;
                    println!("{}", reply);
                }
                None => cli::repl::run_interactive(&mut session).await?,
            }
        }
        Command::Brd(brd_args) => {
            if let Some(project) = &brd_args.project {
                session.select_project(project)?;
            }
            let doc = session.generate_document(&brd_args.to_form())?;
            println!("✅ BRD saved as `{}`.\n", doc.filename);
            print!("{}", doc.content);
        }
        Command::Documents => {
            let documents = session.list_documents()?;
            if documents.is_empty() {
                println!("No BRD files found.");
            }
            for document in documents {
                println!("{}", document);
            }
        }
        Command::Show { filename } => {
            print!("{}", session.read_document(&filename)?);
        }
        Command::Export { project } => {
            session.select_project(&project)?;
            let filename = session.export_transcript()?;
            println!("{}", filename);
        }
        Command::Serve { addr } => {
            let session = match new_chat_client(&config.llm) {
                Ok(client) => session.with_chat_client(client),
                Err(e) => {
                    warn!("Chat provider unavailable, /api/chat is disabled: {}", e);
                    session
                }
            };
            info!("Starting server on: {}", addr);
            Server::new(addr, session).run().await?;
        }
    }

    Ok(())
}
