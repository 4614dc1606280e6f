use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset)"),
        }
        match &self.default_model {
            Some(model) => println!("  default-model: {model}"),
            None => println!("  default-model: (unset)"),
        }
        match self.syntax_enabled() {
            true => println!("  syntax: on"),
            false => println!("  syntax: off"),
        }
        println!("  theme: {}", self.theme_name());
        if self.models.is_empty() {
            println!("  models: (built-in list)");
        } else {
            println!("  models:");
            for model in &self.models {
                println!("    {}: {}", model.value, model.name);
            }
        }
    }
}
