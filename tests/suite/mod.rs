mod layer;
mod recompute;
mod verify;
