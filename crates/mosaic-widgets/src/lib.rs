#![forbid(unsafe_code)]

//! Headless widget state machines for Mosaic.
//!
//! Nothing here draws. A render layer owns the markup, feeds key and pointer
//! events in, and reflects the state each widget reports back out.
//!
//! - Disclosure: [`accordion`], [`tabs`] over the shared [`disclosure`]
//!   registry.
//! - Overlays: [`overlay`] lifecycle, used by [`dialog`], [`context_menu`]
//!   and the [`combobox`] popover; [`tooltip`] timing and placement.
//! - [`command_palette`] over the shortcut registry, and [`toast`]s.

pub mod accordion;
pub mod combobox;
pub mod command_palette;
pub mod context_menu;
pub mod dialog;
pub mod disclosure;
pub mod overlay;
pub mod roving;
pub mod tabs;
pub mod toast;
pub mod tooltip;

pub use accordion::{Accordion, AccordionItem, AccordionMode};
pub use combobox::{ComboOption, Combobox};
pub use command_palette::{
    CommandPalette, PaletteAction, PaletteConfig, PaletteGroup, PALETTE_SHORTCUT_ID,
};
pub use context_menu::{ContextMenu, MenuItem};
pub use dialog::{Dialog, DialogConfig, DialogSize, DialogVariant, SheetSide};
pub use disclosure::DisclosureRegistry;
pub use overlay::{CloseReason, Overlay, OverlayConfig, OverlayPhase};
pub use roving::Direction;
pub use tabs::{ActivationMode, Orientation, Tabs, TabsPanel, TabsTrigger};
pub use toast::{
    Toast, ToastAction, ToastConfig, ToastId, ToastManager, ToastOptions, ToastPlacement,
    ToastTone,
};
pub use tooltip::{
    Tooltip, TooltipAlign, TooltipConfig, TooltipSide, TriggerEvent, TriggerEventKind,
};
