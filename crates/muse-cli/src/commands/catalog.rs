use anyhow::Result;
use muse_infrastructure::save_engine_config;

use super::{App, print_json};

pub async fn seed(app: &App) -> Result<()> {
    let report = app.catalog_service().seed_defaults().await?;
    if report.personas == 0 && report.questions == 0 {
        println!("Catalog already populated in {}", app.paths.base_dir().display());
    } else {
        println!(
            "Installed {} personas and {} questions into {}",
            report.personas,
            report.questions,
            app.paths.catalog_file().display()
        );
    }
    Ok(())
}

pub fn show_config(app: &App, write: bool) -> Result<()> {
    if write {
        save_engine_config(&app.paths.engine_config_file(), &app.config)?;
        println!("Wrote {}", app.paths.engine_config_file().display());
    } else {
        print!("{}", toml::to_string_pretty(&app.config)?);
    }
    Ok(())
}

pub async fn list_personas(app: &App) -> Result<()> {
    let personas = app.catalog_service().list_personas().await?;
    if personas.is_empty() {
        println!("No personas. Run `muse seed` first.");
        return Ok(());
    }
    for p in personas {
        let m = &p.metadata;
        println!(
            "{} {:<12} {:<20} prio={} used={} sat={:.2} switch={:.2}{}",
            p.id,
            p.display_identifier.as_str(),
            p.name,
            m.priority,
            m.usage_count,
            m.satisfaction,
            m.switch_success_rate,
            if m.is_active { "" } else { " (inactive)" }
        );
    }
    Ok(())
}

pub async fn deactivate_persona(app: &App, id: &str) -> Result<()> {
    app.catalog_service().deactivate_persona(id).await?;
    println!("Deactivated persona {}", id);
    Ok(())
}

pub async fn list_questions(app: &App, persona: Option<&str>) -> Result<()> {
    let questions = app.catalog_service().list_questions(persona).await?;
    print_json(&questions)
}

pub async fn deactivate_question(app: &App, id: &str) -> Result<()> {
    app.catalog_service().deactivate_question(id).await?;
    println!("Deactivated question {}", id);
    Ok(())
}
