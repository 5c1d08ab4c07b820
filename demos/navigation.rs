/// Example: a navigation service backed by the container
///
/// The navigator only knows view-model types. It asks the container to build
/// each page on demand; infrastructure is registered once at startup and
/// everything else is discovered automatically.
///
/// Run with `RUST_LOG=ferrous_ioc=debug cargo run --example navigation` to see
/// the container's own events.
use ferrous_ioc::{
    interface, param, ActivationKind, Container, ContainerOptions, DiResult, Injectable, LazyService,
    LoggingObserver, TypeDescriptor, ValueContainer,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

// ===== Infrastructure =====

pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}
interface!(dyn Clock);

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> String {
        "09:30".to_string()
    }
}

impl Injectable for FixedClock {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .default_constructor(|| FixedClock)
            .implements::<dyn Clock>(|this| this)
            .build()
    }
}

pub struct WeatherClient {
    pub endpoint: Url,
    pub city: String,
}

impl WeatherClient {
    pub fn forecast(&self) -> String {
        format!("sunny in {} (via {})", self.city, self.endpoint.host_str().unwrap_or("?"))
    }
}

impl Injectable for WeatherClient {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<Url>("endpoint"), param::<String>("city")], |args| {
                Ok(WeatherClient {
                    endpoint: args.value(0)?,
                    city: args.value(1)?,
                })
            })
            .build()
    }
}

// ===== View-Models =====

pub trait Page: Send + Sync {
    fn render(&self) -> String;
}

pub struct HomePage {
    clock: Arc<dyn Clock>,
    details: LazyService<WeatherPage>,
}

impl Page for HomePage {
    fn render(&self) -> String {
        format!("Home, it is {}", self.clock.now())
    }
}

impl Injectable for HomePage {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor(
                [param::<dyn Clock>("clock"), ferrous_ioc::lazy_param::<WeatherPage>("details")],
                |args| {
                    Ok(HomePage {
                        clock: args.service(0)?,
                        details: args.lazy(1)?,
                    })
                },
            )
            .build()
    }
}

#[derive(Default)]
pub struct WeatherPage {
    client: Mutex<Option<Arc<WeatherClient>>>,
    heading: Mutex<String>,
}

impl Page for WeatherPage {
    fn render(&self) -> String {
        let forecast = self
            .client
            .lock()
            .as_ref()
            .map(|client| client.forecast())
            .unwrap_or_else(|| "no forecast".to_string());
        format!("{}: {}", self.heading.lock(), forecast)
    }
}

impl Injectable for WeatherPage {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .default_constructor(WeatherPage::default)
            .dependency::<WeatherClient, _>("client", |page, client| *page.client.lock() = Some(client))
            .value_dependency::<String, _>("heading", None, |page, heading| *page.heading.lock() = heading)
            .build()
    }
}

// ===== Navigation =====

pub struct Navigator {
    container: Container,
    history: Vec<String>,
}

impl Navigator {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            history: Vec::new(),
        }
    }

    pub fn navigate<T: Injectable + Page>(&mut self) -> DiResult<Arc<T>> {
        let page = self.container.build_up::<T>()?;
        self.history.push(page.render());
        Ok(page)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Ferrous IoC Navigation Example ===\n");

    let container = Container::with_options(ContainerOptions::new().activation(ActivationKind::Compiled));
    container.subscribe(Arc::new(LoggingObserver::with_target("navigation")));

    container.register_type::<dyn Clock, FixedClock>()?.as_singleton();
    container.register::<WeatherClient>()?.as_singleton().with_values(
        ValueContainer::new()
            .with("endpoint", Url::parse("https://weather.example.com/v1")?)
            .with("city", "Lisbon"),
    );
    container.register::<WeatherPage>()?.with_value("heading", "Weather");

    let mut navigator = Navigator::new(container.clone());

    println!("1. Navigating to the home page:");
    let home = navigator.navigate::<HomePage>()?;
    println!("   {}\n", home.render());

    println!("2. Following the lazy link from home:");
    let details = home.details.get()?;
    container.build_up_instance(&details, None)?;
    println!("   {}\n", details.render());

    println!("3. Navigating to the weather page directly:");
    navigator.navigate::<WeatherPage>()?;

    println!("4. History:");
    for (index, entry) in navigator.history.iter().enumerate() {
        println!("   {}. {}", index + 1, entry);
    }

    println!("\n5. Registrations:");
    for descriptor in container.registrations() {
        println!(
            "   {} ({}, {}){}",
            descriptor.key,
            descriptor.kind,
            descriptor
                .lifetime
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string()),
            if descriptor.is_cached { " cached" } else { "" }
        );
    }

    Ok(())
}
