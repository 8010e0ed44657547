//! Grants (or with `--revoke`, removes) the admin role for an existing account.

use beyond_house_backend::db::{self, models::AppRole, models::User};
use std::env;
use std::process;

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin grant-admin <EMAIL> [--revoke]");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let mut email = None;
    let mut revoke = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--revoke" => revoke = true,
            flag if flag.starts_with('-') => usage(),
            _ if email.is_none() => email = Some(arg),
            _ => usage(),
        }
    }
    let Some(email) = email else { usage() };

    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL must be set");
        process::exit(1);
    }

    let pool = match db::init_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Could not connect to the database: {}", e);
            process::exit(1);
        }
    };

    let user = match User::find_by_email(&pool, email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            eprintln!("No account found for {}. Sign up first, then rerun.", email);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Lookup failed: {}", e);
            process::exit(1);
        }
    };

    let result = if revoke {
        User::revoke_role(&pool, user.id, AppRole::Admin).await
    } else {
        User::grant_role(&pool, user.id, AppRole::Admin).await
    };

    match (result, revoke) {
        (Ok(true), false) => println!("{} is now an admin", user.email),
        (Ok(false), false) => println!("{} was already an admin", user.email),
        (Ok(true), true) => println!("Admin role removed from {}", user.email),
        (Ok(false), true) => println!("{} was not an admin", user.email),
        (Err(e), _) => {
            eprintln!("Role update failed: {}", e);
            process::exit(1);
        }
    }
}
