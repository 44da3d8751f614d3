//! A mock [`XConn`] for handler-level tests.
//!
//! Implement [`MockXConn`], overriding only the `mock_*` methods a
//! particular test exercises; everything else returns
//! [`crate::Error::UnimplementedMock`] so an unexpectedly-reached call
//! fails loudly instead of silently doing nothing.
use crate::bindings::{KeyCode, MouseState};
use crate::geometry::{Point, Rect};
use crate::model::Xid;
use crate::x::{Prop, WindowConfig, WmState, XConn, XEvent};
use crate::{Error, Result};

#[allow(unused_variables)]
pub trait MockXConn {
    fn mock_root(&self) -> Xid {
        Xid(0)
    }

    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        Err(Error::UnimplementedMock)
    }

    fn mock_screen_size(&self) -> Result<(u32, u32)> {
        Err(Error::UnimplementedMock)
    }

    fn mock_cursor_position(&self) -> Result<Point> {
        Err(Error::UnimplementedMock)
    }

    fn mock_take_wm_ownership(&self) -> Result<()> {
        Ok(())
    }

    fn mock_grab_keys_and_buttons(&self, keys: &[KeyCode], buttons: &[MouseState]) -> Result<()> {
        Ok(())
    }

    fn mock_grab_pointer_for_motion(&self) -> Result<()> {
        Ok(())
    }

    fn mock_grab_pointer_for_resize(&self) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        Err(Error::UnimplementedMock)
    }

    fn mock_poll_event(&self) -> Result<Option<XEvent>> {
        Ok(None)
    }

    fn mock_flush(&self) {}

    fn mock_sync(&self) -> Result<()> {
        Ok(())
    }

    fn mock_intern_atom(&self, name: &str) -> Result<Xid> {
        Err(Error::UnimplementedMock)
    }

    fn mock_atom_name(&self, atom: Xid) -> Result<String> {
        Err(Error::UnimplementedMock)
    }

    fn mock_client_geometry(&self, client: Xid) -> Result<Rect> {
        Err(Error::UnimplementedMock)
    }

    fn mock_existing_clients(&self) -> Result<Vec<Xid>> {
        Ok(Vec::new())
    }

    fn mock_window_class_and_instance(&self, client: Xid) -> Result<(String, String)> {
        Ok((String::new(), String::new()))
    }

    fn mock_map(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_unmap(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_destroy(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_configure(&self, client: Xid, cfg: WindowConfig) -> Result<()> {
        Ok(())
    }

    fn mock_send_configure_notify(&self, client: Xid, r: Rect, border_width: u32) -> Result<()> {
        Ok(())
    }

    fn mock_set_input_focus(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_set_border_color(&self, client: Xid, pixel: u32) -> Result<()> {
        Ok(())
    }

    fn mock_select_for_client_events(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_select_for_unmap_events_only(&self, client: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_get_prop(&self, client: Xid, name: &str) -> Result<Option<Prop>> {
        Ok(None)
    }

    fn mock_set_prop(&self, client: Xid, name: &str, value: Prop) -> Result<()> {
        Ok(())
    }

    fn mock_delete_prop(&self, client: Xid, name: &str) -> Result<()> {
        Ok(())
    }

    fn mock_get_wm_state(&self, client: Xid) -> Result<Option<WmState>> {
        Ok(None)
    }

    fn mock_set_wm_state(&self, client: Xid, state: WmState) -> Result<()> {
        Ok(())
    }

    fn mock_get_transient_for(&self, client: Xid) -> Result<Option<Xid>> {
        Ok(None)
    }

    fn mock_send_protocol_message(&self, client: Xid, protocol: &str) -> Result<()> {
        Ok(())
    }

    fn mock_supports_protocol(&self, client: Xid, protocol: &str) -> Result<bool> {
        Ok(false)
    }

    fn mock_warp_pointer(&self, client: Xid, x: i32, y: i32) -> Result<()> {
        Ok(())
    }

    fn mock_numlock_mask(&self) -> Result<u16> {
        Ok(0)
    }

    fn mock_connection_fd(&self) -> Option<std::os::unix::io::RawFd> {
        None
    }

    fn mock_support_window(&self) -> Xid {
        Xid(0)
    }

    fn mock_keycode_from_keysym_name(&self, name: &str) -> Result<u8> {
        let _ = name;
        Ok(0)
    }

    fn mock_drain_enter_notify(&self) -> Result<()> {
        Ok(())
    }
}

impl<T> XConn for T
where
    T: MockXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }
    fn screen_details(&self) -> Result<Vec<Rect>> {
        self.mock_screen_details()
    }
    fn screen_size(&self) -> Result<(u32, u32)> {
        self.mock_screen_size()
    }
    fn cursor_position(&self) -> Result<Point> {
        self.mock_cursor_position()
    }
    fn take_wm_ownership(&self) -> Result<()> {
        self.mock_take_wm_ownership()
    }
    fn grab_keys_and_buttons(&self, keys: &[KeyCode], buttons: &[MouseState]) -> Result<()> {
        self.mock_grab_keys_and_buttons(keys, buttons)
    }
    fn grab_pointer_for_motion(&self) -> Result<()> {
        self.mock_grab_pointer_for_motion()
    }
    fn grab_pointer_for_resize(&self) -> Result<()> {
        self.mock_grab_pointer_for_resize()
    }
    fn ungrab_pointer(&self) -> Result<()> {
        self.mock_ungrab_pointer()
    }
    fn next_event(&self) -> Result<XEvent> {
        self.mock_next_event()
    }
    fn poll_event(&self) -> Result<Option<XEvent>> {
        self.mock_poll_event()
    }
    fn flush(&self) {
        self.mock_flush()
    }
    fn sync(&self) -> Result<()> {
        self.mock_sync()
    }
    fn intern_atom(&self, name: &str) -> Result<Xid> {
        self.mock_intern_atom(name)
    }
    fn atom_name(&self, atom: Xid) -> Result<String> {
        self.mock_atom_name(atom)
    }
    fn client_geometry(&self, client: Xid) -> Result<Rect> {
        self.mock_client_geometry(client)
    }
    fn existing_clients(&self) -> Result<Vec<Xid>> {
        self.mock_existing_clients()
    }
    fn window_class_and_instance(&self, client: Xid) -> Result<(String, String)> {
        self.mock_window_class_and_instance(client)
    }
    fn map(&self, client: Xid) -> Result<()> {
        self.mock_map(client)
    }
    fn unmap(&self, client: Xid) -> Result<()> {
        self.mock_unmap(client)
    }
    fn destroy(&self, client: Xid) -> Result<()> {
        self.mock_destroy(client)
    }
    fn configure(&self, client: Xid, cfg: WindowConfig) -> Result<()> {
        self.mock_configure(client, cfg)
    }
    fn send_configure_notify(&self, client: Xid, r: Rect, border_width: u32) -> Result<()> {
        self.mock_send_configure_notify(client, r, border_width)
    }
    fn set_input_focus(&self, client: Xid) -> Result<()> {
        self.mock_set_input_focus(client)
    }
    fn set_border_color(&self, client: Xid, pixel: u32) -> Result<()> {
        self.mock_set_border_color(client, pixel)
    }
    fn select_for_client_events(&self, client: Xid) -> Result<()> {
        self.mock_select_for_client_events(client)
    }
    fn select_for_unmap_events_only(&self, client: Xid) -> Result<()> {
        self.mock_select_for_unmap_events_only(client)
    }
    fn get_prop(&self, client: Xid, name: &str) -> Result<Option<Prop>> {
        self.mock_get_prop(client, name)
    }
    fn set_prop(&self, client: Xid, name: &str, value: Prop) -> Result<()> {
        self.mock_set_prop(client, name, value)
    }
    fn delete_prop(&self, client: Xid, name: &str) -> Result<()> {
        self.mock_delete_prop(client, name)
    }
    fn get_wm_state(&self, client: Xid) -> Result<Option<WmState>> {
        self.mock_get_wm_state(client)
    }
    fn set_wm_state(&self, client: Xid, state: WmState) -> Result<()> {
        self.mock_set_wm_state(client, state)
    }
    fn get_transient_for(&self, client: Xid) -> Result<Option<Xid>> {
        self.mock_get_transient_for(client)
    }
    fn send_protocol_message(&self, client: Xid, protocol: &str) -> Result<()> {
        self.mock_send_protocol_message(client, protocol)
    }
    fn supports_protocol(&self, client: Xid, protocol: &str) -> Result<bool> {
        self.mock_supports_protocol(client, protocol)
    }
    fn warp_pointer(&self, client: Xid, x: i32, y: i32) -> Result<()> {
        self.mock_warp_pointer(client, x, y)
    }
    fn numlock_mask(&self) -> Result<u16> {
        self.mock_numlock_mask()
    }
    fn connection_fd(&self) -> Option<std::os::unix::io::RawFd> {
        self.mock_connection_fd()
    }
    fn support_window(&self) -> Xid {
        self.mock_support_window()
    }
    fn keycode_from_keysym_name(&self, name: &str) -> Result<u8> {
        self.mock_keycode_from_keysym_name(name)
    }
    fn drain_enter_notify(&self) -> Result<()> {
        self.mock_drain_enter_notify()
    }
}

/// A [`MockXConn`] with every method at its default: a convenient `&X`
/// argument for tests that exercise pure state but still need to pass
/// something implementing [`XConn`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StubXConn;

impl MockXConn for StubXConn {}
