use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use pharmadesk::api::models::{LoginRequest, PrescriptionFile, ReceiptChannel, UserType};
use pharmadesk::api::{HttpClient, PharmacyApi};
use pharmadesk::chatbot::ChatbotWidget;
use pharmadesk::config::{Config, Role};
use pharmadesk::dashboard::{AdminDashboard, Section, StaffDashboard};
use pharmadesk::executor::Executor;
use pharmadesk::i18n::I18n;
use pharmadesk::init::PageInitializer;
use pharmadesk::notify::{Notifier, ToastBoard};
use pharmadesk::services::{start_clock, Clock};
use pharmadesk::ui::{Document, Form, Host, Table};

type Error = Box<dyn std::error::Error + Send + Sync>;

const HELP: &str = "\
Available commands:
/login <username> <password>  Sign in with the configured role.
/stats                        Show today's counters.
/medicines                    List medicines (admin) or sellable stock (staff).
/add key=value;...            Add a medicine (admin).
/edit <id> [key=value;...]    Edit a medicine (admin).
/delete <id>                  Delete a medicine after confirmation (admin).
/search <text>                Filter the visible table.
/sales                        Show the sales records (staff).
/sell key=value;...           Record a sale; medicine=<id>, prescription=<file> (staff).
/receipt <sale id> [twilio]   Send a receipt (staff).
/pay order|verify <payment id> <signature>  Pay for the sale in the form (staff).
/chat <message>               Ask the medical assistant.
/open, /close                 Open or close the assistant panel.
/logout                       End the session.
/help                         Show this help.
/quit                         Leave the desk.";

#[derive(Debug, PartialEq)]
enum Command {
    Login { username: String, password: String },
    Stats,
    Medicines,
    Add(Form),
    Edit { id: i64, fields: Form },
    Delete(i64),
    Search(String),
    Sales,
    Sell(Form),
    Receipt { sale_id: i64, channel: ReceiptChannel },
    PayOrder,
    PayVerify { payment_id: String, signature: String },
    Chat(String),
    Open,
    Close,
    Logout,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let id = |text: &str| {
            text.parse::<i64>()
                .map_err(|_| format!("`{}` is not a valid id", text))
        };

        match name {
            "/login" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                [username, password] => Ok(Command::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                }),
                _ => Err("usage: /login <username> <password>".to_string()),
            },
            "/stats" => Ok(Command::Stats),
            "/medicines" => Ok(Command::Medicines),
            "/add" => Ok(Command::Add(parse_fields(rest))),
            "/edit" => {
                let (target, fields) = rest.split_once(' ').unwrap_or((rest, ""));
                Ok(Command::Edit {
                    id: id(target)?,
                    fields: parse_fields(fields),
                })
            }
            "/delete" => Ok(Command::Delete(id(rest)?)),
            "/search" => Ok(Command::Search(rest.to_string())),
            "/sales" => Ok(Command::Sales),
            "/sell" => Ok(Command::Sell(parse_fields(rest))),
            "/receipt" => {
                let mut parts = rest.split_whitespace();
                let sale_id = id(parts.next().unwrap_or(""))?;
                let channel = match parts.next() {
                    Some("twilio") => ReceiptChannel::Twilio,
                    None | Some("whatsapp") => ReceiptChannel::WhatsApp,
                    Some(other) => return Err(format!("unknown receipt channel `{}`", other)),
                };
                Ok(Command::Receipt { sale_id, channel })
            }
            "/pay" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                ["order"] => Ok(Command::PayOrder),
                ["verify", payment_id, signature] => Ok(Command::PayVerify {
                    payment_id: payment_id.to_string(),
                    signature: signature.to_string(),
                }),
                _ => Err("usage: /pay order | /pay verify <payment id> <signature>".to_string()),
            },
            "/chat" => Ok(Command::Chat(rest.to_string())),
            "/open" => Ok(Command::Open),
            "/close" => Ok(Command::Close),
            "/logout" => Ok(Command::Logout),
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            other => Err(format!("unknown command `{}`, try /help", other)),
        }
    }
}

/// Parses `key=value;key=value` into a form.
fn parse_fields(text: &str) -> Form {
    text.split(';')
        .filter_map(|pair| pair.split_once('='))
        .fold(Form::new(), |form, (key, value)| {
            form.with(key.trim(), value.trim())
        })
}

/// Reads stdin on its own task and hands every line over a channel.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (sender, receiver) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin());
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    if sender.send(line.trim_end().to_string()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    receiver
}

/// Terminal stand-in for the browser: commands and confirmations come from
/// the same stdin lines, and navigation ends the session.
struct TerminalHost {
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
    navigated: RefCell<Option<String>>,
}

impl TerminalHost {
    fn new(lines: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            lines: Mutex::new(lines),
            navigated: RefCell::new(None),
        }
    }

    /// The next line typed, or `None` once stdin is closed.
    async fn read_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }
}

#[async_trait(?Send)]
impl Host for TerminalHost {
    async fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = io::stdout().flush();
        match self.read_line().await {
            Some(answer) => matches!(answer.trim(), "y" | "Y" | "yes"),
            None => false,
        }
    }

    fn navigate(&self, target: &str) {
        println!("-> {}", target);
        *self.navigated.borrow_mut() = Some(target.to_string());
    }
}

enum Desk {
    Admin(AdminDashboard<HttpClient>),
    Staff(StaffDashboard<HttpClient>),
}

fn print_table(table: &Table) {
    let mut shown = 0;
    for row in table.visible_rows() {
        let key = row.key.map(|k| format!("#{:<4} ", k)).unwrap_or_default();
        println!("{}{}", key, row.cells.join(" | "));
        shown += 1;
    }
    if shown == 0 {
        println!("(nothing to show)");
    }
}

/// Builds the page the decorations are applied to from the current table.
fn desk_page(table: &Table) -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let menu_toggle = doc.append(body, "button");
    doc.set_attr(menu_toggle, "aria-label", "Toggle menu");
    let menu = doc.append(body, "nav");
    doc.add_class(menu, "mobile-menu").add_class(menu, "hidden");
    let search = doc.append(body, "div");
    let input = doc.append(search, "input");
    doc.set_attr(input, "type", "text");
    let element = doc.append(body, "table");
    let tbody = doc.append(element, "tbody");
    for _ in table.visible_rows() {
        doc.append(tbody, "tr");
    }
    doc
}

async fn read_prescription(form: &Form) -> Result<Option<PrescriptionFile>, Error> {
    let path = form.get("prescription");
    if path.is_empty() {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path).await?;
    let file_name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "prescription".to_string());
    let content_type = match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    };
    Ok(Some(PrescriptionFile {
        file_name,
        content_type: content_type.to_string(),
        bytes,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting the pharmacy desk...");

    dotenv().ok();

    let config = Config::load()?;
    let role = config.role()?;

    let api = Arc::new(HttpClient::new(
        &config.api_base_url,
        &config.chatbot_base_url,
    )?);
    let i18n = I18n::new(config.language.clone());
    let notifier = Notifier::new();
    let executor = Executor::new(notifier.clone(), i18n.clone());

    let mut board = ToastBoard::new(&notifier, config.toast_duration());
    tokio::spawn(async move {
        while let Some(toast) = board.next().await {
            println!("[{}] {}", toast.kind.as_str(), toast.message);
        }
    });

    let clock = Clock::new();
    let mut sched = start_clock(clock.clone()).await?;

    let host = TerminalHost::new(spawn_stdin_reader());
    let mut chatbot = ChatbotWidget::new(i18n.clone());
    chatbot.load_history(api.as_ref()).await;

    let mut desk = match role {
        Role::Admin => {
            let mut admin = AdminDashboard::new(api.clone(), executor.clone(), &config.auth_entry);
            admin.attach_clock(clock.clone());
            Desk::Admin(admin)
        }
        Role::Staff => Desk::Staff(StaffDashboard::new(
            api.clone(),
            executor.clone(),
            &config.auth_entry,
        )),
    };

    println!("{}", HELP);

    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let Some(line) = host.read_line().await else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        log::info!(
            "Received {} command",
            line.split_whitespace().next().unwrap_or_default()
        );

        let command = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Login { username, password } => {
                let user_type = match role {
                    Role::Admin => UserType::Admin,
                    Role::Staff => UserType::Staff,
                };
                let request = LoginRequest {
                    username,
                    password,
                    user_type,
                };
                match api.login(&request).await {
                    Ok(user) => {
                        notifier.success(format!("Welcome, {}", user.full_name));
                        match &mut desk {
                            Desk::Admin(admin) => admin.load().await,
                            Desk::Staff(staff) => staff.load().await,
                        }
                    }
                    Err(e) => {
                        log::error!("Login failed: {}", e);
                        notifier.error(e.server_message().unwrap_or("Login failed").to_string());
                    }
                }
                continue;
            }
            Command::Chat(text) => {
                if chatbot.send(api.as_ref(), &text).await {
                    if let Some(html) = chatbot.render().last() {
                        println!("{}", html);
                    }
                } else if !chatbot.is_open() {
                    notifier.warning("Open the assistant first with /open");
                }
                continue;
            }
            Command::Open => {
                chatbot.open();
                continue;
            }
            Command::Close => {
                chatbot.close();
                continue;
            }
            other => other,
        };

        match (&mut desk, command) {
            (Desk::Admin(admin), Command::Stats) => {
                let _ = admin.load_stats().await;
                println!("{:?}", admin.stats);
                let face = admin.clock();
                println!("{} {}", face.date, face.time);
            }
            (Desk::Staff(staff), Command::Stats) => {
                let _ = staff.load_stats().await;
                println!("{:?}", staff.stats);
            }
            (Desk::Admin(admin), Command::Medicines) => {
                if admin.load_medicines().await.is_ok() {
                    let mut page = desk_page(&admin.table);
                    let report = PageInitializer::new().run(&mut page);
                    log::debug!("Decorated medicines page: {:?}", report);
                }
                print_table(&admin.table);
            }
            (Desk::Staff(staff), Command::Medicines) => {
                let _ = staff.load_available().await;
                for option in &staff.options {
                    println!("#{:<4} {}", option.id, option.label);
                }
            }
            (Desk::Admin(admin), Command::Add(form)) => {
                admin.open_add();
                admin.add_form = form;
                if admin.add_medicine().await.is_err() {
                    admin.close_add();
                }
            }
            (Desk::Admin(admin), Command::Edit { id, fields }) => {
                if admin.open_edit(id).await.is_ok() {
                    for key in [
                        "medicine_name",
                        "batch_number",
                        "expiry_date",
                        "date_of_purchase",
                        "quantity_available",
                        "unit_price",
                        "manufacturer",
                        "category",
                        "description",
                    ] {
                        if !fields.get(key).is_empty() {
                            admin.edit_form.set(key, fields.get(key));
                        }
                    }
                    if admin.update_medicine().await.is_err() {
                        admin.close_edit();
                    }
                }
            }
            (Desk::Admin(admin), Command::Delete(id)) => {
                let _ = admin.delete_medicine(id, &host).await;
            }
            (Desk::Admin(admin), Command::Search(query)) => {
                admin.search(&query);
                print_table(&admin.table);
            }
            (Desk::Staff(staff), Command::Search(query)) => {
                staff.search(&query);
                print_table(&staff.sales);
            }
            (Desk::Staff(staff), Command::Sales) => {
                staff.show_section(Section::Records).await;
                print_table(&staff.records);
            }
            (Desk::Staff(staff), Command::Sell(form)) => {
                let prescription = match read_prescription(&form).await {
                    Ok(file) => file,
                    Err(e) => {
                        println!("Could not read prescription: {}", e);
                        continue;
                    }
                };
                let quantity = form.get("quantity_sold").to_string();
                staff.select_medicine(form.int("medicine"));
                staff.sale_form = form;
                staff.set_quantity(&quantity);
                if let Some(file) = prescription {
                    staff.attach_prescription(file);
                }
                println!("Total: {}", staff.total);
                if let Ok(Some(sale_id)) = staff.record_sale().await {
                    println!("Sale #{} recorded", sale_id);
                }
            }
            (Desk::Staff(staff), Command::Receipt { sale_id, channel }) => {
                let _ = staff.send_receipt(sale_id, channel).await;
            }
            (Desk::Staff(staff), Command::PayOrder) => {
                if let Ok(order) = staff.create_payment_order().await {
                    println!("Order {} for {} {}", order.id, order.amount, order.currency);
                }
            }
            (
                Desk::Staff(staff),
                Command::PayVerify {
                    payment_id,
                    signature,
                },
            ) => {
                if let Ok(Some(sale_id)) = staff.verify_payment(&payment_id, &signature).await {
                    println!("Sale #{} recorded", sale_id);
                }
            }
            (Desk::Admin(admin), Command::Logout) => {
                let _ = admin.logout(&host).await;
            }
            (Desk::Staff(staff), Command::Logout) => {
                let _ = staff.logout(&host).await;
            }
            (_, command) => {
                notifier.warning(format!("{:?} is not available for this role", command));
            }
        }

        if host.navigated.borrow().is_some() {
            break;
        }
    }

    sched.shutdown().await?;
    log::info!("Shutting down gracefully");
    Ok(())
}
