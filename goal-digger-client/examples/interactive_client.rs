use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use goal_digger_client::{
    connect, init_logging, ClientConfig, EventDispatcher, EventType, RestAuth, RestStore, Session,
    SyncEvent,
};
use goal_digger_core::validation::{Credentials, ProfileForm, SignUpForm};
use goal_digger_core::{ListFilter, TaskForm};
use std::sync::Arc;
use uuid::Uuid;

type RestSession = Session<RestStore, RestAuth>;

#[derive(Parser)]
#[command(name = "goal-digger")]
#[command(about = "Interactive task manager client", long_about = None)]
struct Cli {
    /// Project URL (falls back to GOAL_DIGGER_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Public API key (falls back to GOAL_DIGGER_ANON_KEY)
    #[arg(short = 'k', long)]
    anon_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("warn");
    let cli = Cli::parse();

    let config = match (cli.url, cli.anon_key) {
        (Some(url), Some(key)) => ClientConfig::new(url, key),
        _ => ClientConfig::from_env()?,
    };

    println!("{}", "🎯 Goal Digger".bold().cyan());
    println!("{}", "==============".cyan());
    println!("🌐 Backend: {}", config.project_url.blue());

    let (store, auth) = connect(config)?;
    sign_in(&auth).await?;

    let events = Arc::new(EventDispatcher::new());
    events.register_callback_filtered(
        |event| {
            if let SyncEvent::Error { scope, message } = event {
                println!("{} {}", format!("[{}]", scope).red(), message.red());
            }
        },
        EventType::Error,
    )?;

    let mut session = Session::start(Arc::new(store), Arc::new(auth), events.clone()).await?;
    events.process_events()?;
    if let Some(user) = session.user() {
        println!("👤 Signed in as {}", user.display_name().green());
    }

    loop {
        let choices = vec![
            "📋 Show tasks",
            "➕ Create task",
            "✏️  Edit task",
            "✅ Toggle task",
            "🗑️  Delete task",
            "🔍 Filter by list",
            "📁 Manage lists",
            "👤 Profile",
            "🚪 Sign out",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()?;

        // errors are reported through the event callback
        let _ = match selection {
            0 => {
                show_tasks(&session);
                Ok(())
            }
            1 => create_task(&mut session).await,
            2 => edit_task(&mut session).await,
            3 => toggle_task(&mut session).await,
            4 => delete_task(&mut session).await,
            5 => choose_filter(&mut session),
            6 => manage_lists(&mut session).await,
            7 => profile(&session).await,
            _ => {
                if Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Sign out?")
                    .interact()?
                {
                    let signed_out = session.sign_out().await;
                    events.process_events()?;
                    if signed_out.is_ok() {
                        break;
                    }
                }
                Ok(())
            }
        };
        events.process_events()?;
    }

    println!("{}", "👋 Bye".cyan());
    Ok(())
}

async fn sign_in(auth: &RestAuth) -> Result<(), Box<dyn std::error::Error>> {
    let theme = ColorfulTheme::default();
    loop {
        let mode = Select::with_theme(&theme)
            .items(&["Sign in", "Sign up"])
            .default(0)
            .interact()?;
        let email: String = Input::with_theme(&theme).with_prompt("Email").interact_text()?;
        let password = Password::with_theme(&theme).with_prompt("Password").interact()?;

        let result = if mode == 0 {
            auth.sign_in_with_password(&Credentials::new(email, password))
                .await
        } else {
            let display_name: String = Input::with_theme(&theme)
                .with_prompt("Display name")
                .interact_text()?;
            auth.sign_up(&SignUpForm {
                display_name,
                email,
                password,
            })
            .await
        };

        match result {
            Ok(_) => return Ok(()),
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

fn show_tasks(session: &RestSession) {
    let tasks = session.visible_tasks();
    if tasks.is_empty() {
        println!("{}", "Your tasks will appear here.".dimmed());
        return;
    }
    for task in tasks {
        let mark = if task.completed { "✔".green() } else { "☐".normal() };
        let title = if task.completed {
            task.title.strikethrough()
        } else {
            task.title.normal()
        };
        let list = task
            .list_id
            .and_then(|id| session.lists().title_of(&id))
            .map(|t| format!(" 📋 {}", t))
            .unwrap_or_default();
        let due = task
            .due_date
            .map(|d| format!(" · Due: {}", d))
            .unwrap_or_default();
        println!("{} {}{}{}", mark, title, due.yellow(), list.blue());
        if !task.description_or_default().is_empty() {
            println!("    {}", task.description_or_default().dimmed());
        }
    }
}

fn pick_task(session: &RestSession) -> Result<Option<Uuid>, Box<dyn std::error::Error>> {
    let tasks = session.visible_tasks();
    if tasks.is_empty() {
        println!("{}", "No tasks".dimmed());
        return Ok(None);
    }
    let labels: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Task")
        .items(&labels)
        .interact()?;
    Ok(Some(tasks[index].task_id))
}

fn pick_list(session: &RestSession, prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut labels = vec!["No list selected".to_string()];
    labels.extend(session.lists().lists().iter().map(|l| l.title.clone()));
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(match index {
        0 => String::new(),
        i => session.lists().lists()[i - 1].list_id.to_string(),
    })
}

fn fill_form(session: &RestSession, initial: TaskForm) -> Result<TaskForm, Box<dyn std::error::Error>> {
    let theme = ColorfulTheme::default();
    let title = Input::with_theme(&theme)
        .with_prompt("Title")
        .with_initial_text(initial.title)
        .interact_text()?;
    let description = Input::with_theme(&theme)
        .with_prompt("Description (optional)")
        .with_initial_text(initial.description)
        .allow_empty(true)
        .interact_text()?;
    let due_date = Input::with_theme(&theme)
        .with_prompt("Due date YYYY-MM-DD (optional)")
        .with_initial_text(initial.due_date)
        .allow_empty(true)
        .interact_text()?;
    let list_id = pick_list(session, "List")?;
    Ok(TaskForm {
        title,
        description,
        due_date,
        list_id,
    })
}

async fn create_task(session: &mut RestSession) -> Result<(), Box<dyn std::error::Error>> {
    let form = fill_form(session, TaskForm::default())?;
    let task = session.tasks_mut().create(&form).await?;
    println!("✅ Created {}", task.title.green());
    Ok(())
}

async fn edit_task(session: &mut RestSession) -> Result<(), Box<dyn std::error::Error>> {
    let Some(task_id) = pick_task(session)? else {
        return Ok(());
    };
    let initial = session.tasks_mut().begin_edit(task_id)?;
    let form = fill_form(session, initial)?;
    match session.tasks_mut().submit_edit(&form).await {
        Ok(task) => println!("✅ Saved {}", task.title.green()),
        Err(e) => {
            session.tasks_mut().cancel_edit();
            return Err(e.into());
        }
    }
    Ok(())
}

async fn toggle_task(session: &mut RestSession) -> Result<(), Box<dyn std::error::Error>> {
    let Some(task_id) = pick_task(session)? else {
        return Ok(());
    };
    let current = session
        .tasks()
        .get(&task_id)
        .map(|t| t.completed)
        .unwrap_or_default();
    session.tasks_mut().toggle_completion(task_id, current).await?;
    Ok(())
}

async fn delete_task(session: &mut RestSession) -> Result<(), Box<dyn std::error::Error>> {
    let Some(task_id) = pick_task(session)? else {
        return Ok(());
    };
    session.tasks_mut().delete(task_id).await?;
    println!("🗑️  Deleted");
    Ok(())
}

fn choose_filter(session: &mut RestSession) -> Result<(), Box<dyn std::error::Error>> {
    let mut labels = vec!["All Tasks".to_string(), "Tasks without a list".to_string()];
    labels.extend(session.lists().lists().iter().map(|l| l.title.clone()));
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Filter by List")
        .items(&labels)
        .default(0)
        .interact()?;
    let filter = match index {
        0 => ListFilter::All,
        1 => ListFilter::Unassigned,
        i => ListFilter::List(session.lists().lists()[i - 2].list_id),
    };
    session.set_filter(filter);
    Ok(())
}

async fn manage_lists(session: &mut RestSession) -> Result<(), Box<dyn std::error::Error>> {
    let theme = ColorfulTheme::default();
    for list in session.lists().lists() {
        println!(
            "📋 {} {}",
            list.title.bold(),
            format!("(created {})", list.created_at.date_naive()).dimmed()
        );
    }

    let action = Select::with_theme(&theme)
        .items(&["+ New list", "Rename list", "Delete list", "Back"])
        .default(0)
        .interact()?;
    match action {
        0 => {
            let title: String = Input::with_theme(&theme)
                .with_prompt("Enter list name")
                .interact_text()?;
            session.lists_mut().create(&title).await?;
        }
        1 | 2 => {
            let list_id = pick_list(session, "Which list?")?;
            let Ok(list_id) = Uuid::parse_str(&list_id) else {
                return Ok(());
            };
            if action == 1 {
                let title: String = Input::with_theme(&theme)
                    .with_prompt("New name")
                    .interact_text()?;
                session.lists_mut().rename(list_id, &title).await?;
            } else {
                let confirm = |prompt: &str| {
                    Confirm::with_theme(&ColorfulTheme::default())
                        .with_prompt(prompt)
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                };
                session.lists_mut().delete(list_id, &confirm).await?;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn profile(session: &RestSession) -> Result<(), Box<dyn std::error::Error>> {
    let theme = ColorfulTheme::default();
    let profile = session.profile().load().await?;
    println!("📧 {}", profile.email.green());
    println!("🗓️  Member since {}", profile.created_at.date_naive());
    println!("👤 {}", profile.display_name.bold());

    if !Confirm::with_theme(&theme)
        .with_prompt("Update profile?")
        .default(false)
        .interact()?
    {
        return Ok(());
    }

    let display_name = Input::with_theme(&theme)
        .with_prompt("Display name")
        .with_initial_text(profile.display_name)
        .allow_empty(true)
        .interact_text()?;
    let password = Password::with_theme(&theme)
        .with_prompt("New password (leave blank to keep)")
        .allow_empty_password(true)
        .interact()?;
    let confirm_password = if password.is_empty() {
        String::new()
    } else {
        Password::with_theme(&theme)
            .with_prompt("Confirm password")
            .interact()?
    };

    session
        .profile()
        .update(&ProfileForm {
            display_name,
            password,
            confirm_password,
        })
        .await?;
    println!("{}", "Profile updated".green());
    Ok(())
}
