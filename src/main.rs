#[rocket::launch]
fn launch() -> _ {
    account_api::rocket()
}
