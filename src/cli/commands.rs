//! One function per subcommand.

use super::common::{
    print_error, print_info, print_success, prompt_secret, CliContext,
};
use crate::api::{BookingBackend, BookingFilter, BookingRecord, TaskFilter};
use crate::auth::IdentityProvider;
use crate::booking::{Checkout, CheckoutState, FormField, ShopPicker, Tier};
use crate::catalog::{self, CategoryKey};
use crate::geo::CancelToken;
use crate::services::{BookingList, ListView, TaskComposer, TaskList, TaskOutcome};
use crate::utils::path::format_path_for_display;
use crate::utils::{get_config_path, get_log_dir};
use anyhow::{bail, Context, Result};
use tracing::info;

/// Booking form values given on the command line.
pub struct VehicleVisit {
    pub date: String,
    pub time: String,
    pub make: String,
    pub model: String,
    pub registration: String,
    pub notes: String,
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_secret("Password"),
    }
}

pub fn login(ctx: &CliContext, email: &str, password: Option<String>) -> Result<()> {
    info!("CLI: login");
    let password = password_or_prompt(password)?;
    let auth = ctx.auth()?;
    let session = ctx.block_on(auth.sign_in_with_password(email, &password))?;
    print_success(&format!("Signed in as {}", session.user.label()));
    Ok(())
}

pub fn signup(ctx: &CliContext, email: &str, password: Option<String>) -> Result<()> {
    info!("CLI: signup");
    let password = password_or_prompt(password)?;
    let auth = ctx.auth()?;
    let outcome = ctx.block_on(auth.sign_up(email, &password))?;
    print_success(outcome.message());
    Ok(())
}

pub fn logout(ctx: &CliContext) -> Result<()> {
    let auth = ctx.auth()?;
    ctx.block_on(auth.sign_out())?;
    print_success("Signed out");
    Ok(())
}

pub fn whoami(ctx: &CliContext) -> Result<()> {
    match ctx.current_user()? {
        Some(user) => println!("Signed in as {}", user.label()),
        None => print_info("Not signed in"),
    }
    Ok(())
}

pub fn locate(ctx: &CliContext) -> Result<()> {
    let resolver = ctx.resolver()?;
    let cancel = CancelToken::new();
    println!("Detecting location... (Ctrl+C to cancel)");

    let result = ctx.block_on(async {
        let watcher = cancel.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                watcher.cancel();
            }
        });
        let result = resolver.detect_location(&cancel).await;
        ctrl_c.abort();
        result
    });

    let detection = result?;
    println!("📍 {}", detection.address);
    if detection.substituted {
        print_info(&format!(
            "Reported position {} is outside the service area; showing {} instead.",
            detection.reported, detection.resolved
        ));
    }
    Ok(())
}

pub fn services(search: Option<&str>) {
    let matches = catalog::search(search.unwrap_or(""));
    if matches.is_empty() {
        println!("No services found.");
        return;
    }
    for category in matches {
        println!(
            "{} {:<16} {:<16} {}",
            category.icon,
            category.key.as_str(),
            category.name,
            category.description
        );
    }
}

pub fn shops(ctx: &CliContext, category: CategoryKey, tier: Tier) -> Result<()> {
    let listing = ctx.config.pricing_table().listing(category, tier)?;
    println!("{} - {} tier", category.category().name, tier);
    if let Some(summary) = category.tier_summary(tier == Tier::Premium) {
        println!("{}", summary);
    }
    println!();
    println!("{:<5} {:<26} {:>8} {:>7} {:>7} {:>8}", "ID", "SHOP", "DIST", "RATING", "PRICE", "ETA");
    for shop in listing {
        println!(
            "{:<5} {:<26} {:>5.1} km {:>7.1} {:>7} {:>4} min",
            shop.id,
            shop.name,
            shop.distance_km,
            shop.rating,
            format!("${}", shop.price),
            shop.eta_minutes
        );
    }
    Ok(())
}

pub fn book(ctx: &CliContext, category: CategoryKey, shop_id: &str, tier: Tier, visit: VehicleVisit) -> Result<()> {
    let mut picker = ShopPicker::new(category, ctx.config.pricing_table());
    picker.select_tier(tier)?;
    if !picker.select_shop(shop_id) {
        bail!(
            "Unknown shop '{}' for {}. See 'servicebay shops {}'",
            shop_id,
            category.category().name,
            category
        );
    }
    let draft = picker.proceed().context("Pick a shop to proceed.")?;

    let mut checkout = Checkout::new(category, Some(draft));
    for (field, value) in [
        (FormField::Date, visit.date),
        (FormField::Time, visit.time),
        (FormField::VehicleMake, visit.make),
        (FormField::VehicleModel, visit.model),
        (FormField::Registration, visit.registration),
        (FormField::Notes, visit.notes),
    ] {
        checkout.form.set(field, value);
    }

    let user = ctx.require_user()?;
    let booking = checkout.prepare(Some(&user))?;
    let backend = ctx.backend()?;
    let result = ctx.block_on(backend.create_booking(&booking));
    checkout.finish(result);

    match checkout.state() {
        CheckoutState::Completed => {
            print_success(&format!(
                "Booked {} at {} on {} {} (${}, {} tier)",
                category.category().name,
                booking.shop_name,
                booking.date,
                booking.time,
                booking.price,
                booking.tier
            ));
            Ok(())
        }
        _ => bail!(checkout.message().unwrap_or("Failed to confirm booking.").to_string()),
    }
}

pub fn bookings(ctx: &CliContext, filter: BookingFilter) -> Result<()> {
    let user = ctx.require_user()?;
    let backend = ctx.backend()?;
    let mut list = BookingList::new();
    ctx.block_on(list.load(&backend, Some(&user)));
    list.set_filter(filter);

    match list.view() {
        ListView::Loading => {}
        ListView::Failed(message) => bail!(message.to_string()),
        ListView::Empty(message) => println!("{}", message),
        ListView::Rows(records) => {
            for record in records {
                println!("{}", booking_row(record));
            }
        }
    }
    if let Some(total) = list.total() {
        println!("{} total", total);
    }
    Ok(())
}

fn booking_row(record: &BookingRecord) -> String {
    let service = record
        .category()
        .map_or(record.service_type.as_str(), |k| k.category().name);
    format!(
        "{:<12} {:<16} {:<24} {:<9} ${:<5} {} {}  {} {} ({}){}",
        record.display_key(),
        service,
        record.shop_name,
        record.tier,
        record.price,
        record.date,
        record.time,
        record.vehicle_make,
        record.vehicle_model,
        record.registration,
        record.notes().map(|n| format!("  {}", n)).unwrap_or_default()
    )
}

pub fn tasks(ctx: &CliContext, status: TaskFilter) -> Result<()> {
    let backend = ctx.backend()?;
    let mut list = TaskList::new();
    ctx.block_on(list.load(&backend, status));

    match list.view() {
        ListView::Loading => {}
        ListView::Failed(message) => bail!(message.to_string()),
        ListView::Empty(message) => println!("{}", message),
        ListView::Rows(tasks) => {
            for task in tasks {
                println!("{:<12} {:<28} {}", task.task_status, task.task_name, task.task_description);
            }
        }
    }
    Ok(())
}

pub fn task_add(ctx: &CliContext, name: String, description: String, status: String) -> Result<()> {
    let backend = ctx.backend()?;
    let mut composer = TaskComposer::new();
    composer.name = name;
    composer.description = description;
    composer.status = status;

    match ctx.block_on(composer.submit(&backend)) {
        Some(TaskOutcome::Created) => {
            print_success(TaskOutcome::Created.message());
            Ok(())
        }
        Some(outcome) => bail!(outcome.message()),
        None => bail!("A task is already being submitted."),
    }
}

pub fn config() {
    println!("{}", format_path_for_display(&get_config_path()));
}

pub fn logs() {
    let log_file = get_log_dir().join("servicebay.log");
    println!("Logs are written to: {}", format_path_for_display(&log_file));
    println!();
    println!("View in real time:  tail -f {:?}", log_file);
    println!("More detail:        RUST_LOG=debug servicebay");
    if !log_file.exists() {
        print_error("No log file yet. It is created the first time the UI runs.");
    }
}
