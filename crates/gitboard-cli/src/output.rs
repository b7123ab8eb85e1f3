use colored::Colorize;
use tabled::{Table, Tabled, settings::Style};

use gitboard_core::GithubRepo;

pub fn print_success(message: &str) {
    println!("{} {message}", "✓".green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", "✗".red());
}

#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "Repository")]
    full_name: String,
    #[tabled(rename = "Stars")]
    stars: u64,
    #[tabled(rename = "Forks")]
    forks: u64,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn print_repo_table(repos: &[GithubRepo]) {
    if repos.is_empty() {
        println!("{}", "No repositories available right now.".yellow());
        return;
    }

    let rows: Vec<RepoRow> = repos
        .iter()
        .map(|repo| RepoRow {
            full_name: repo.full_name.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            language: repo.language.clone(),
            description: truncate(&repo.description, 60),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}
