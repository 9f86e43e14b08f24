use crate::{Cli, Command, render};
use anyhow::{Context, bail};
use async_trait::async_trait;
use portal_core::config::PortalConfig;
use portal_core::devices::HttpDevice;
use portal_core::page::{MessageKind, PortalState, View};
use portal_core::traits::{DeviceApi, Notifier};
use portal_core::PortalController;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;

/// 终端里的 alert：直接打印，不需要额外确认
struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn alert(&self, message: &str) {
        println!("🔔 {}", message);
    }
}

// --- 1. 选择设备实现 ---
fn build_device(cli: &Cli, config: &PortalConfig) -> anyhow::Result<Arc<dyn DeviceApi>> {
    #[cfg(feature = "device_mock")]
    {
        if cli.mock {
            println!("🤖 Using mock device");
            return Ok(Arc::new(portal_core::devices::MockDevice::new()));
        }
    }
    #[cfg(not(feature = "device_mock"))]
    let _ = cli;

    println!("📡 Using device at {}", config.device_url);
    Ok(Arc::new(HttpDevice::new(&config.device_url)?))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = PortalConfig::load(cli.config.as_deref())
        .await
        .context("failed to load configuration")?;
    if let Some(url) = &cli.device_url {
        config.device_url = url.clone();
        config.validate()?;
    }
    tracing::debug!(?config, "Configuration loaded");

    let device = build_device(&cli, &config)?;
    let controller = PortalController::new(device, Arc::new(ConsoleNotifier), config.ap_ssid);

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Status => {
            controller.get_status().await;
            print!("{}", render::page(&controller.snapshot()));
        }
        Command::Scan => {
            controller.scan().await;
            print!("{}", render::page(&controller.snapshot()));
        }
        Command::Connect { ssid, password } => connect(&controller, &ssid, password).await?,
        Command::Disconnect => {
            controller.get_status().await;
            if controller.view() == View::Station {
                controller.disconnect().await;
            } else {
                println!("ℹ️  Device is not connected to a network, nothing to do.");
            }
        }
        Command::Watch => watch_clock(&controller).await?,
        Command::Interactive => interactive(&controller).await?,
    }
    Ok(())
}

/// 终端输入：命令行与密码
struct Console {
    lines: Lines<BufReader<Stdin>>,
    /// 密码是否明文回显（对应网页上的 Show/Hide 按钮）
    reveal: bool,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            reveal: false,
        }
    }

    async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    /// Reads a password, without echo unless revealed.
    async fn password(&mut self, ssid: &str) -> anyhow::Result<String> {
        let prompt = format!(
            "🔑 Password for '{}' (`:show`/`:hide` toggles echo, `:cancel` aborts): ",
            ssid
        );
        if self.reveal {
            print!("{}", prompt);
            std::io::stdout().flush()?;
            self.next_line()
                .await?
                .context("input closed while waiting for the password")
        } else {
            let password =
                tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt)).await??;
            Ok(password)
        }
    }
}

/// What a line typed at the password prompt means.
#[derive(Debug, PartialEq)]
enum PromptInput {
    Cancel,
    Reveal(bool),
    Blank,
    Password(String),
}

fn classify(input: String) -> PromptInput {
    match input.trim() {
        ":cancel" => PromptInput::Cancel,
        ":show" => PromptInput::Reveal(true),
        ":hide" => PromptInput::Reveal(false),
        "" => PromptInput::Blank,
        _ => PromptInput::Password(input),
    }
}

/// Asks until the prompt yields a password; `None` when it was cancelled.
/// Blank input goes to the controller, which rejects it and keeps the prompt.
async fn read_credential(
    controller: &PortalController,
    console: &mut Console,
) -> anyhow::Result<Option<String>> {
    while let Some(prompt) = controller.snapshot().prompt {
        match classify(console.password(&prompt.ssid).await?) {
            PromptInput::Cancel => {
                controller.dismiss_prompt();
                println!("Cancelled.");
                return Ok(None);
            }
            PromptInput::Reveal(reveal) => console.reveal = reveal,
            PromptInput::Blank => controller.submit_credential("").await,
            PromptInput::Password(password) => return Ok(Some(password)),
        }
    }
    Ok(None)
}

async fn connect(
    controller: &PortalController,
    ssid: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    controller.scan().await;
    if !controller.snapshot().networks.iter().any(|n| n.ssid == ssid) {
        bail!("network '{}' not found in scan results", ssid);
    }

    controller.select_network(ssid);
    controller.request_connect().await;
    if controller.snapshot().prompt.is_some() {
        let password = match password {
            Some(password) => password,
            None => match read_credential(controller, &mut Console::new()).await? {
                Some(password) => password,
                None => bail!("cancelled"),
            },
        };
        controller.submit_credential(&password).await;
    }

    let state = controller.snapshot();
    if let Some(prompt) = &state.prompt {
        bail!(
            "{}",
            prompt.validation.as_deref().unwrap_or("password was not accepted")
        );
    }
    if let Some(status) = &state.status {
        println!("{}", render::status_line(status));
        if status.kind == MessageKind::Error {
            bail!("device did not join '{}'", ssid);
        }
    }
    Ok(())
}

async fn watch_clock(controller: &PortalController) -> anyhow::Result<()> {
    controller.get_status().await;
    if controller.view() != View::Station {
        println!("ℹ️  Device is in access point mode, no clock to follow.");
        return Ok(());
    }
    print!("{}", render::page(&controller.snapshot()));

    let mut rx = controller.subscribe();
    let mut last = rx.borrow_and_update().clone();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                for line in render::changes(&last, &state) {
                    println!("{}", line);
                }
                if !state.polling {
                    println!("📴 Device left station mode.");
                    break;
                }
                last = state;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

/// Prints what changed on the page while the session runs.
async fn follow_page(mut rx: watch::Receiver<PortalState>) {
    let mut last = rx.borrow_and_update().clone();
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        for line in render::changes(&last, &state) {
            println!("{}", line);
        }
        last = state;
    }
}

/// 设备请求可能长时间挂起，放到后台执行，结果由 follow_page 打印
fn in_background<F>(controller: &PortalController, op: impl FnOnce(PortalController) -> F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(op(controller.clone()));
}

fn print_help() {
    println!("Commands:");
    println!("  scan               scan for networks");
    println!("  show               print the page");
    println!("  select <n|ssid>    pick a network from the list");
    println!("  connect            join the selected network");
    println!("  disconnect         leave the network, restart in access point mode");
    println!("  status             check the device mode again");
    println!("  reload             start over as on a fresh page load");
    println!("  quit");
}

async fn interactive(controller: &PortalController) -> anyhow::Result<()> {
    let mut console = Console::new();
    let follower = tokio::spawn(follow_page(controller.subscribe()));

    print_help();
    in_background(controller, |c| async move { c.initialize().await });

    while let Some(line) = console.next_line().await? {
        let (command, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        match command {
            "" => {}
            "scan" => in_background(controller, |c| async move { c.scan().await }),
            "show" | "list" => print!("{}", render::page(&controller.snapshot())),
            "select" => {
                let ssid = render::resolve_selection(&controller.snapshot(), arg.trim());
                controller.select_network(&ssid);
                if controller.snapshot().connect_enabled {
                    println!("Selected '{}'.", ssid);
                } else {
                    println!("'{}' cannot be selected now.", ssid);
                }
            }
            "connect" => {
                let page = controller.snapshot();
                if page.selected.is_none() {
                    println!("Select a network first.");
                } else if page.requires_credential {
                    // 打开密码框不需要请求设备
                    controller.request_connect().await;
                    if let Some(password) = read_credential(controller, &mut console).await? {
                        in_background(controller, move |c| async move {
                            c.submit_credential(&password).await
                        });
                    }
                } else {
                    in_background(controller, |c| async move { c.request_connect().await });
                }
            }
            "disconnect" => in_background(controller, |c| async move { c.disconnect().await }),
            "status" => in_background(controller, |c| async move { c.get_status().await }),
            "reload" => in_background(controller, |c| async move { c.reload().await }),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("Unknown command '{}', type `help`.", other),
        }
    }

    follower.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::structs::{
        ConnectRequest, ConnectResponse, DeviceStatus, DisconnectResponse, ScanResponse,
    };
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use tokio::time::Duration;

    #[test]
    fn prompt_commands_are_not_passwords() {
        assert_eq!(classify(":cancel".into()), PromptInput::Cancel);
        assert_eq!(classify(" :show ".into()), PromptInput::Reveal(true));
        assert_eq!(classify(":hide".into()), PromptInput::Reveal(false));
        assert_eq!(classify("   ".into()), PromptInput::Blank);
        assert_eq!(
            classify(" hunter2 ".into()),
            PromptInput::Password(" hunter2 ".into())
        );
    }

    /// Status requests hang until released.
    struct StalledDevice {
        release: Notify,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl DeviceApi for StalledDevice {
        async fn scan(&self) -> portal_core::Result<ScanResponse> {
            Ok(ScanResponse::default())
        }
        async fn status(&self) -> portal_core::Result<DeviceStatus> {
            *self.calls.lock().unwrap() += 1;
            self.release.notified().await;
            Ok(DeviceStatus::default())
        }
        async fn connect(&self, _: &ConnectRequest) -> portal_core::Result<ConnectResponse> {
            unreachable!()
        }
        async fn disconnect(&self) -> portal_core::Result<DisconnectResponse> {
            unreachable!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn background_operations_do_not_hold_the_caller() {
        let device = Arc::new(StalledDevice {
            release: Notify::new(),
            calls: Mutex::new(0),
        });
        let controller =
            PortalController::new(device.clone(), Arc::new(ConsoleNotifier), "Clock");

        in_background(&controller, |c| async move { c.get_status().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*device.calls.lock().unwrap(), 1);
        let status = controller.snapshot().status.unwrap();
        assert_eq!(status.text, "Checking connection status...");

        device.release.notify_one();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(controller.snapshot().status.is_none());
        assert_eq!(controller.view(), View::AccessPoint);
    }
}
