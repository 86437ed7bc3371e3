// Library root
// -----------
// This crate backs up one reference image per dog breed / sub-breed from
// the dog.ceo catalog into a Yandex.Disk-style storage account. The binary
// (`main.rs`) wires the modules below into an interactive CLI.
//
// Module responsibilities:
// - `config`: endpoints, remote folder layout and local file paths.
// - `logging`: the single process-wide log setup (console + file).
// - `storage`: folder creation and URL-based uploads on the storage service.
// - `catalog`: breed listing and random image lookup on the catalog service.
// - `manifest`: transfer records and the JSON manifest written per run.
// - `orchestrator`: sequences a whole backup run over the two clients.
// - `ui`: banners, prompts and progress bars.
//
// `storage` and `catalog` never reference each other; only the
// orchestrator knows about both.
pub mod catalog;
pub mod config;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod storage;
pub mod ui;
