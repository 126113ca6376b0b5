use dispatcher_core_k8s::manager::Ctx as _;
use dispatcher_operator::Ctx;

#[tokio::main]
async fn main() {
    Ctx::spawn_crd().await
}
