use courier_api::{
  domain::{
    environment::{Environment, EnvironmentVariable},
    request::CurrentRequest,
  },
  utilities::request::prepare_request,
};

#[test]
fn env_var_substitution_applies_correctly_in_urls() {
  let environment = Environment::new(vec![EnvironmentVariable {
    key: String::from("HOST_URL"),
    value: String::from("https://httpbin.org"),
    enabled: true,
  }]);
  let request = CurrentRequest {
    url: String::from("{{HOST_URL}}/json"),
    ..Default::default()
  };
  let prepared = prepare_request(&request, &environment).unwrap();
  assert_eq!(prepared.url.as_str(), "https://httpbin.org/json");
}

#[test]
fn disabled_variables_are_not_substituted() {
  let environment = Environment::new(vec![EnvironmentVariable {
    key: String::from("HOST_URL"),
    value: String::from("https://httpbin.org"),
    enabled: false,
  }]);
  assert_eq!(environment.substitute("{{HOST_URL}}/json"), "{{HOST_URL}}/json");
}

#[test]
fn returns_base_url_if_env_vars_dont_exist() {
  let environment = Environment::default();
  assert_eq!(environment.substitute("{{BOGUS}}/json"), "{{BOGUS}}/json");
}
