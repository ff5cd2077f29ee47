use courier_api::{
    domain::{
        environment::Environment, history::History, response::Response, saved::SavedRequest,
    },
    utilities::formatting::{format_response_size, format_response_time, truncate_text},
};

const URL_WIDTH: usize = 60;

pub fn print_response(response: &Response) {
    println!(
        "{} {} -> {} ({}, {})",
        response.method,
        response.url,
        response.status,
        format_response_time(response.response_time_ms),
        format_response_size(response.response_size)
    );
    for header in response.headers.iter() {
        println!("{}: {}", header.key, header.value);
    }
    println!();
    println!("{}", response.data.to_display_string());
}

pub fn print_history(history: &History) {
    if history.is_empty() {
        println!("No requests yet");
        return;
    }
    for item in history.iter() {
        println!(
            "{}  {}  {:<7} {:>3}  {}",
            item.id,
            item.timestamp.format("%Y-%m-%d %H:%M:%S"),
            item.method,
            item.status,
            truncate_text(&item.url, URL_WIDTH)
        );
    }
}

pub fn print_saved(saved: &[SavedRequest]) {
    if saved.is_empty() {
        println!("No saved requests");
        return;
    }
    for request in saved {
        let tags = if request.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", request.tags.join(", "))
        };
        println!(
            "{}  {:<7} {}  {}{}",
            request.id,
            request.method,
            request.name,
            truncate_text(&request.url, URL_WIDTH),
            tags
        );
    }
}

pub fn print_environment(environment: &Environment) {
    if environment.variables().is_empty() {
        println!("No environment variables");
        return;
    }
    for variable in environment.variables() {
        let state = if variable.enabled { "" } else { "  (disabled)" };
        println!("{}={}{}", variable.key, variable.value, state);
    }
}
