pub const NAME: &str = "dispatcher-operator";
